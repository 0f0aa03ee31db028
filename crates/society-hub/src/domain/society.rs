use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{require_text, SocietyId, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocietyPlan {
    Basic,
    Premium,
    Enterprise,
}

impl SocietyPlan {
    pub const fn ordered() -> [Self; 3] {
        [Self::Basic, Self::Premium, Self::Enterprise]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Basic => "Basic",
            Self::Premium => "Premium",
            Self::Enterprise => "Enterprise",
        }
    }
}

/// A residential society, the tenant every other record is scoped to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Society {
    pub id: SocietyId,
    pub name: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    pub primary_color: String,
    pub secondary_color: String,
    pub total_units: u32,
    pub created_at: DateTime<Utc>,
    pub plan: SocietyPlan,
}

impl Society {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("id", self.id.as_str())?;
        require_text("name", &self.name)?;
        require_text("address", &self.address)?;
        check_color("primary_color", &self.primary_color)?;
        check_color("secondary_color", &self.secondary_color)?;
        Ok(())
    }

    /// Merge the provided fields, leaving unspecified ones untouched.
    pub fn apply(&mut self, update: SocietyUpdate) -> Result<(), ValidationError> {
        let mut merged = self.clone();

        if let Some(name) = update.name {
            merged.name = name;
        }
        if let Some(address) = update.address {
            merged.address = address;
        }
        if let Some(logo) = update.logo {
            merged.logo = Some(logo);
        }
        if let Some(color) = update.primary_color {
            merged.primary_color = color;
        }
        if let Some(color) = update.secondary_color {
            merged.secondary_color = color;
        }
        if let Some(total_units) = update.total_units {
            merged.total_units = total_units;
        }
        if let Some(plan) = update.plan {
            merged.plan = plan;
        }

        merged.validate()?;
        *self = merged;
        Ok(())
    }
}

/// Partial update for the settings screen. The id is never changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocietyUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub primary_color: Option<String>,
    #[serde(default)]
    pub secondary_color: Option<String>,
    #[serde(default)]
    pub total_units: Option<u32>,
    #[serde(default)]
    pub plan: Option<SocietyPlan>,
}

fn check_color(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let hex = value.strip_prefix('#').unwrap_or_default();
    if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidColor {
            field,
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn society() -> Society {
        Society {
            id: SocietyId::new("1"),
            name: "Green Valley Apartments".to_string(),
            address: "123 Main St".to_string(),
            logo: None,
            primary_color: "#3B82F6".to_string(),
            secondary_color: "#10B981".to_string(),
            total_units: 120,
            created_at: Utc::now(),
            plan: SocietyPlan::Premium,
        }
    }

    #[test]
    fn apply_merges_only_provided_fields() {
        let mut society = society();
        society
            .apply(SocietyUpdate {
                name: Some("Green Valley Towers".to_string()),
                total_units: Some(140),
                ..SocietyUpdate::default()
            })
            .expect("update is valid");

        assert_eq!(society.name, "Green Valley Towers");
        assert_eq!(society.total_units, 140);
        assert_eq!(society.address, "123 Main St");
        assert_eq!(society.plan, SocietyPlan::Premium);
    }

    #[test]
    fn apply_rejects_bad_colour_without_partial_write() {
        let mut society = society();
        let err = society
            .apply(SocietyUpdate {
                name: Some("Renamed".to_string()),
                primary_color: Some("blue".to_string()),
                ..SocietyUpdate::default()
            })
            .expect_err("colour is not hex");

        assert!(matches!(
            err,
            ValidationError::InvalidColor {
                field: "primary_color",
                ..
            }
        ));
        assert_eq!(society.name, "Green Valley Apartments");
    }
}
