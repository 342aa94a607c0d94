use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const BUILTIN: &[(&str, &[&str])] = &[
    (
        "Tagbilaran City",
        &[
            "Bool",
            "Booy",
            "Cabawan",
            "Cogon",
            "Dampas",
            "Dao",
            "Manga",
            "Mansasa",
            "Poblacion I",
            "Poblacion II",
            "Poblacion III",
            "San Isidro",
            "Taloto",
            "Tiptip",
            "Ubujan",
        ],
    ),
    (
        "Panglao",
        &[
            "Bil-isan",
            "Bolod",
            "Danao",
            "Doljo",
            "Libaong",
            "Looc",
            "Lourdes",
            "Poblacion",
            "Tangnan",
            "Tawala",
        ],
    ),
    (
        "Dauis",
        &[
            "Biking",
            "Bingag",
            "Catarman",
            "Dao",
            "Mariveles",
            "Mayacabac",
            "Poblacion",
            "San Isidro",
            "Songculan",
            "Tabalong",
            "Tinago",
            "Totolan",
        ],
    ),
];

#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("invalid location data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("municipality name is required")]
    EmptyMunicipality,
    #[error("duplicate municipality '{0}'")]
    DuplicateMunicipality(String),
    #[error("municipality '{0}' has an empty barangay name")]
    EmptyBarangay(String),
    #[error("duplicate barangay '{barangay}' in '{municipality}'")]
    DuplicateBarangay {
        municipality: String,
        barangay: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Municipality {
    pub name: String,
    pub barangays: Vec<String>,
}

/// Municipality → barangay lookup, in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationHierarchy {
    municipalities: Vec<Municipality>,
}

impl LocationHierarchy {
    pub fn builtin() -> Self {
        Self {
            municipalities: BUILTIN
                .iter()
                .map(|(name, barangays)| Municipality {
                    name: (*name).to_string(),
                    barangays: barangays.iter().map(|b| (*b).to_string()).collect(),
                })
                .collect(),
        }
    }

    pub fn new(municipalities: Vec<Municipality>) -> Result<Self, LocationError> {
        let hierarchy = Self { municipalities };
        validate_hierarchy(&hierarchy)?;
        Ok(hierarchy)
    }

    pub fn from_json(text: &str) -> Result<Self, LocationError> {
        let municipalities: Vec<Municipality> = serde_json::from_str(text)?;
        Self::new(municipalities)
    }

    pub fn municipalities(&self) -> impl Iterator<Item = &str> {
        self.municipalities.iter().map(|m| m.name.as_str())
    }

    /// Unknown or empty names resolve to an empty slice.
    pub fn barangays_of(&self, municipality: &str) -> &[String] {
        if municipality.is_empty() {
            return &[];
        }
        self.municipalities
            .iter()
            .find(|m| m.name == municipality)
            .map(|m| m.barangays.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, municipality: &str, barangay: &str) -> bool {
        self.barangays_of(municipality).iter().any(|b| b == barangay)
    }
}

pub fn validate_hierarchy(hierarchy: &LocationHierarchy) -> Result<(), LocationError> {
    let mut seen = BTreeSet::new();
    for municipality in &hierarchy.municipalities {
        let name = municipality.name.trim();
        if name.is_empty() {
            return Err(LocationError::EmptyMunicipality);
        }
        if !seen.insert(name) {
            return Err(LocationError::DuplicateMunicipality(name.to_string()));
        }

        let mut barangays = BTreeSet::new();
        for barangay in &municipality.barangays {
            if barangay.trim().is_empty() {
                return Err(LocationError::EmptyBarangay(name.to_string()));
            }
            if !barangays.insert(barangay.as_str()) {
                return Err(LocationError::DuplicateBarangay {
                    municipality: name.to_string(),
                    barangay: barangay.clone(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_data_is_valid() {
        let hierarchy = LocationHierarchy::builtin();
        assert!(validate_hierarchy(&hierarchy).is_ok());
        assert_eq!(
            hierarchy.municipalities().collect::<Vec<_>>(),
            vec!["Tagbilaran City", "Panglao", "Dauis"]
        );
    }

    #[test]
    fn barangays_keep_declaration_order() {
        let hierarchy = LocationHierarchy::builtin();
        let barangays = hierarchy.barangays_of("Panglao");
        assert_eq!(barangays.first().map(String::as_str), Some("Bil-isan"));
        assert_eq!(barangays.last().map(String::as_str), Some("Tawala"));
    }

    #[test]
    fn unknown_municipality_is_empty() {
        let hierarchy = LocationHierarchy::builtin();
        assert!(hierarchy.barangays_of("Alpha").is_empty());
        assert!(hierarchy.barangays_of("").is_empty());
        assert!(hierarchy.barangays_of("Alpha").is_empty());
        assert!(!hierarchy.contains("Alpha", "Dao"));
    }

    #[test]
    fn same_barangay_name_in_two_municipalities() {
        let hierarchy = LocationHierarchy::builtin();
        assert!(hierarchy.contains("Tagbilaran City", "Dao"));
        assert!(hierarchy.contains("Dauis", "Dao"));
        assert!(!hierarchy.contains("Panglao", "Dao"));
    }

    #[test]
    fn loads_json_data_set() {
        let hierarchy = LocationHierarchy::from_json(
            r#"[{"name": "Alpha", "barangays": ["North", "South"]}]"#,
        )
        .expect("load");
        assert_eq!(hierarchy.barangays_of("Alpha"), ["North", "South"]);
    }

    #[test]
    fn rejects_duplicate_barangay() {
        let err = LocationHierarchy::from_json(
            r#"[{"name": "Alpha", "barangays": ["North", "North"]}]"#,
        )
        .expect_err("duplicate");
        assert!(matches!(err, LocationError::DuplicateBarangay { .. }));
    }

    #[test]
    fn rejects_duplicate_municipality() {
        let err = LocationHierarchy::from_json(
            r#"[{"name": "Alpha", "barangays": []}, {"name": "Alpha", "barangays": []}]"#,
        )
        .expect_err("duplicate");
        assert!(matches!(err, LocationError::DuplicateMunicipality(name) if name == "Alpha"));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            LocationHierarchy::from_json("{"),
            Err(LocationError::Parse(_))
        ));
    }
}
