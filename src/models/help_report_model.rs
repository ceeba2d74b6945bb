//! models/help_report_model.rs
//! Reporte de ayuda enviado desde el dashboard (botón flotante "Help").

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelpReport {
    #[serde(default)]
    pub reporter_name: String,
    #[serde(default)]
    pub reporter_phone: String,
    #[serde(default)]
    pub reporter_email: String,
    #[serde(default)]
    pub village: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub lat: Option<Coord>,
    #[serde(default)]
    pub lon: Option<Coord>,
    #[serde(default)]
    pub needs: String,
}

/// Coordenada tal como llega del dashboard: número o texto ("17.25").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coord {
    Number(f64),
    Text(String),
}

fn or_dash(value: &str) -> &str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        "-"
    } else {
        trimmed
    }
}

fn coord(value: &Option<Coord>) -> String {
    match value {
        Some(Coord::Number(v)) => v.to_string(),
        Some(Coord::Text(t)) => or_dash(t).to_string(),
        None => "-".to_string(),
    }
}

impl HelpReport {
    pub fn subject(&self) -> String {
        let village = match self.village.trim() {
            "" => "Unknown village",
            v => v,
        };
        format!("🚨 Help needed: {}, {}", village, self.district.trim())
    }

    pub fn summary(&self) -> String {
        format!(
            "Reporter: {} ({}, {})\nLocation: {}, {}, {}\nCoords: {}, {}\nNeeds: {}",
            or_dash(&self.reporter_name),
            or_dash(&self.reporter_phone),
            or_dash(&self.reporter_email),
            or_dash(&self.village),
            or_dash(&self.district),
            or_dash(&self.state),
            coord(&self.lat),
            coord(&self.lon),
            or_dash(&self.needs),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_falls_back_to_unknown_village() {
        let report = HelpReport {
            district: "East Godavari".into(),
            ..Default::default()
        };
        assert_eq!(report.subject(), "🚨 Help needed: Unknown village, East Godavari");
    }

    #[test]
    fn summary_renders_missing_fields_as_dash() {
        let report = HelpReport {
            reporter_name: "Ravi".into(),
            reporter_phone: "+919876543210".into(),
            village: "Polavaram".into(),
            district: "Eluru".into(),
            state: "Andhra Pradesh".into(),
            lat: Some(Coord::Number(17.25)),
            needs: "Boats, drinking water".into(),
            ..Default::default()
        };

        assert_eq!(
            report.summary(),
            "Reporter: Ravi (+919876543210, -)\n\
             Location: Polavaram, Eluru, Andhra Pradesh\n\
             Coords: 17.25, -\n\
             Needs: Boats, drinking water"
        );
    }

    #[test]
    fn coordinates_may_arrive_as_text() {
        let report: HelpReport = serde_json::from_value(serde_json::json!({
            "village": "Polavaram",
            "lat": "17.25",
            "lon": " ",
            "needs": "Food"
        }))
        .unwrap();

        assert_eq!(report.lat, Some(Coord::Text("17.25".into())));
        assert!(report.summary().contains("Coords: 17.25, -"));
    }
}
