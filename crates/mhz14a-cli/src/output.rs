//! Result reporting

use serde::Serialize;

use mhz14a_core::session::{SensorCommand, SessionOptions};

/// Outcome of a successful command, as printed with `--json`
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Report {
    pub device: String,
    pub command: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span_point: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concentration: Option<u16>,
}

impl Report {
    pub fn from_options(opts: &SessionOptions) -> Self {
        let (command, span_point) = match opts.command {
            SensorCommand::ReadGasConcentration => ("read", None),
            SensorCommand::CalibrateZero => ("zero", None),
            SensorCommand::CalibrateSpan(span) => ("span", Some(span)),
        };
        Self {
            device: opts.serial.device.display().to_string(),
            command,
            span_point,
            concentration: opts.gas_concentration,
        }
    }

    /// Human-readable single line
    pub fn to_text(&self) -> String {
        match (self.concentration, self.span_point) {
            (Some(ppm), _) => format!("{}", ppm),
            (None, Some(span)) => format!("span point calibration to {} ppm sent", span),
            (None, None) => "zero point calibration sent".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_read_report_json() {
        let mut opts = SessionOptions::new("/dev/ttyS0", SensorCommand::ReadGasConcentration);
        opts.gas_concentration = Some(608);
        let report = Report::from_options(&opts);

        assert_eq!(report.to_text(), "608");
        assert_eq!(
            serde_json::to_string(&report).unwrap(),
            r#"{"device":"/dev/ttyS0","command":"read","concentration":608}"#
        );
    }

    #[test]
    fn test_span_report_json() {
        let opts = SessionOptions::new("/dev/ttyS0", SensorCommand::CalibrateSpan(2000));
        let report = Report::from_options(&opts);

        assert_eq!(report.to_text(), "span point calibration to 2000 ppm sent");
        assert_eq!(
            serde_json::to_string(&report).unwrap(),
            r#"{"device":"/dev/ttyS0","command":"span","span_point":2000}"#
        );
    }
}
