use super::{Clinic, ClinicError, ClinicLocator, ClinicQuery, GeoPoint};

/// Offline provider over a fixed set of Shanghai clinics with precomputed
/// distances. Used when no AMap key is configured.
pub struct BundledClinics {
    clinics: Vec<Clinic>,
}

fn clinic(id: &str, name: &str, address: &str, distance: u32, tel: &str, lat: f64, lng: f64) -> Clinic {
    Clinic {
        id: id.into(),
        name: name.into(),
        address: address.into(),
        distance,
        tel: tel.into(),
        location: GeoPoint { lat, lng },
    }
}

impl BundledClinics {
    pub fn new() -> Self {
        Self {
            clinics: vec![
                clinic("1", "Community Health Service Center (Xuhui)", "123 Yixueyuan Road, Xuhui District, Shanghai", 800, "021-12345678", 31.1982, 121.4375),
                clinic("2", "Children's Health Hospital (Pudong)", "3040 Zhangyang Road, Pudong New Area, Shanghai", 1200, "021-87654321", 31.2288, 121.5427),
                clinic("3", "Maternal and Child Health Hospital (Jing'an)", "166 Jiangning Road, Jing'an District, Shanghai", 2100, "021-55555555", 31.2341, 121.4542),
                clinic("4", "General Hospital Vaccination Point", "197 Ruijin 2nd Road, Huangpu District, Shanghai", 3200, "021-66666666", 31.2148, 121.4779),
                clinic("5", "Preventive Care Center Vaccination Point", "999 Changning Road, Changning District, Shanghai", 4100, "021-77777777", 31.2197, 121.4242),
            ],
        }
    }
}

impl Default for BundledClinics {
    fn default() -> Self {
        Self::new()
    }
}

impl ClinicLocator for BundledClinics {
    fn search_nearby(&self, query: &ClinicQuery) -> Result<Vec<Clinic>, ClinicError> {
        let keyword = query.keyword().map(str::to_lowercase);
        let radius = query.radius_m();

        let mut found: Vec<Clinic> = self
            .clinics
            .iter()
            .filter(|c| c.distance <= radius)
            .filter(|c| match &keyword {
                Some(k) => c.name.to_lowercase().contains(k) || c.address.to_lowercase().contains(k),
                None => true,
            })
            .cloned()
            .collect();
        found.sort_by_key(|c| c.distance);
        Ok(found)
    }

    fn provider_name(&self) -> &'static str {
        "bundled"
    }
}
