use serde_json::{Map, Value, json};

use super::{AxisSpec, ChartSpec};

impl ChartSpec {
    /// Options document handed to the charting library when the chart is generated.
    #[must_use]
    pub fn options(&self, source_url: &str) -> Value {
        let axes: Map<String, Value> = self
            .series
            .iter()
            .map(|s| (s.key.clone(), json!(s.axis)))
            .collect();
        let names: Map<String, Value> = self
            .series
            .iter()
            .map(|s| (s.key.clone(), json!(s.name)))
            .collect();

        let mut axis = json!({
            "x": {
                "type": "timeseries",
                "localtime": true,
                "tick": {
                    "count": self.x_tick_count,
                    "format": self.x_tick_format,
                },
            },
            "y": value_axis(&self.y),
        });
        if let Some(y2) = &self.y2 {
            let mut y2_options = value_axis(y2);
            y2_options["show"] = json!(true);
            axis["y2"] = y2_options;
        }

        json!({
            "bindto": self.container,
            "size": { "height": self.height },
            "data": {
                "type": "line",
                "x": self.x_column,
                "xFormat": self.x_format,
                "url": source_url,
                "axes": axes,
                "names": names,
            },
            "grid": { "y": { "show": true } },
            "axis": axis,
            "subchart": { "show": self.subchart },
            "zoom": { "enabled": self.zoom },
        })
    }
}

fn value_axis(spec: &AxisSpec) -> Value {
    json!({
        "label": {
            "text": spec.label,
            "position": "outer-middle",
        },
        "tick": {
            "unit": spec.unit,
            "precision": 2,
        },
    })
}

#[cfg(test)]
mod tests {
    use crate::charts::{ChartKind, ChartSpec};

    #[test]
    fn pressure_options_document() {
        let spec = ChartSpec::for_kind(ChartKind::Pressure, true);
        let options = spec.options("http://station.local/meteo/pressure.csv");

        assert_eq!(options["bindto"], "#pressure-chart");
        assert_eq!(options["size"]["height"], 500);
        assert_eq!(options["data"]["xFormat"], "%Y-%m-%d %H:%M:%S");
        assert_eq!(options["data"]["url"], "http://station.local/meteo/pressure.csv");
        assert_eq!(options["data"]["axes"]["pressure"], "y2");
        assert_eq!(options["data"]["names"]["temperature"], "External Temperature");
        assert_eq!(options["axis"]["x"]["tick"]["count"], 8);
        assert_eq!(options["axis"]["y2"]["show"], true);
        assert_eq!(options["axis"]["y2"]["label"]["text"], "Pressure");
        assert_eq!(options["zoom"]["enabled"], true);
    }

    #[test]
    fn presence_options_have_no_second_axis() {
        let options = ChartSpec::for_kind(ChartKind::Presence, false).options("./presence.csv");
        assert!(options["axis"].get("y2").is_none());
        assert_eq!(options["data"]["axes"]["count"], "y");
    }
}
