/// Default sequence plotter
///
/// Each block of the sequence is drawn as a flat segment per channel. A block
/// reads its length from `duration` (seconds) and each channel amplitude from
/// either a bare number or an object with an `amplitude` field. Anything
/// missing counts as zero.

use serde_json::Value;

use super::{Channel, SequencePlot, SequencePlotter, Trace};
use crate::data::model::{ScannerModel, SequenceModel};

#[derive(Debug, Clone, Copy, Default)]
pub struct WaveformPlotter;

fn amplitude(block: &Value, channel: Channel) -> f64 {
    match block.get(channel.key()) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::Object(obj)) => obj.get("amplitude").and_then(Value::as_f64).unwrap_or(0.0),
        _ => 0.0,
    }
}

fn duration(index: usize, block: &Value) -> Result<f64, String> {
    match block.get("duration") {
        None | Some(Value::Null) => Ok(0.0),
        Some(v) => match v.as_f64() {
            Some(d) if d.is_finite() && d >= 0.0 => Ok(d),
            Some(d) => Err(format!("Block {} has invalid duration {}", index, d)),
            None => Err(format!("Block {} duration is not a number", index)),
        },
    }
}

impl SequencePlotter for WaveformPlotter {
    fn plot(&self, _scan: &ScannerModel, seq: &SequenceModel) -> Result<SequencePlot, String> {
        let blocks = match seq.blocks() {
            Some(b) => b,
            None => return Ok(SequencePlot::default()),
        };

        let mut traces: Vec<Trace> = Channel::ALL
            .iter()
            .map(|&channel| Trace {
                channel,
                points: vec![[0.0, 0.0]],
            })
            .collect();

        let mut t = 0.0;
        for (i, block) in blocks.iter().enumerate() {
            let d = duration(i, block)?;
            for trace in traces.iter_mut() {
                let a = amplitude(block, trace.channel);
                trace.points.push([t, a]);
                trace.points.push([t + d, a]);
            }
            t += d;
        }

        for trace in traces.iter_mut() {
            trace.points.push([t, 0.0]);
        }

        Ok(SequencePlot {
            traces,
            total_duration: t,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan() -> ScannerModel {
        ScannerModel::from_ui("{}").unwrap()
    }

    #[test]
    fn test_steps_follow_blocks() {
        let seq = SequenceModel::from_ui(
            r#"{"blocks":[{"duration":0.001,"rf":1.0},{"duration":0.002,"gx":{"amplitude":0.5}}]}"#,
        )
        .unwrap();
        let plot = WaveformPlotter.plot(&scan(), &seq).unwrap();
        assert!((plot.total_duration - 0.003).abs() < 1e-12);

        let rf = plot.traces.iter().find(|t| t.channel == Channel::Rf).unwrap();
        assert_eq!(rf.points[1], [0.0, 1.0]);
        assert_eq!(rf.points[2], [0.001, 1.0]);
        assert_eq!(rf.points[3][1], 0.0);

        let gx = plot.traces.iter().find(|t| t.channel == Channel::Gx).unwrap();
        assert_eq!(gx.points[3], [0.001, 0.5]);
        assert_eq!(gx.points.last().unwrap()[1], 0.0);
    }

    #[test]
    fn test_no_blocks_is_empty_plot() {
        let seq = SequenceModel::from_ui(r#"{"name":"x"}"#).unwrap();
        assert_eq!(WaveformPlotter.plot(&scan(), &seq).unwrap(), SequencePlot::default());
    }

    #[test]
    fn test_negative_duration_rejected() {
        let seq = SequenceModel::from_ui(r#"{"blocks":[{"duration":-1}]}"#).unwrap();
        let err = WaveformPlotter.plot(&scan(), &seq).unwrap_err();
        assert!(err.contains("Block 0"));
    }
}
