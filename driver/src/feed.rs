//! Data feed sinks for decoded measurements.

use serde::Serialize;
use tokio::sync::mpsc;
use ut32x_protocol::{MeasurementRecord, MeasurementSink};

/// A measurement sink with an explicit end-of-stream marker
pub trait DataFeed: MeasurementSink {
    /// Called once acquisition has fully stopped
    fn end(&mut self) {}
}

impl DataFeed for Vec<MeasurementRecord> {}

/// Items delivered over a [`ChannelFeed`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FeedEvent {
    Measurement(MeasurementRecord),
    End,
}

impl FeedEvent {
    /// One JSON object per event, for line-oriented consumers
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Forwards measurements to an unbounded tokio channel
///
/// Unbounded so that `emit` never blocks the transfer callback.
#[derive(Debug, Clone)]
pub struct ChannelFeed {
    tx: mpsc::UnboundedSender<FeedEvent>,
}

impl ChannelFeed {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<FeedEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl MeasurementSink for ChannelFeed {
    fn emit(&mut self, record: MeasurementRecord) {
        if self.tx.send(FeedEvent::Measurement(record)).is_err() {
            log::debug!("Feed receiver dropped, discarding measurement");
        }
    }
}

impl DataFeed for ChannelFeed {
    fn end(&mut self) {
        if self.tx.send(FeedEvent::End).is_err() {
            log::debug!("Feed receiver dropped, discarding end of feed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ut32x_protocol::{Channel, Temperature, Unit};

    fn record() -> MeasurementRecord {
        MeasurementRecord {
            temperature: Temperature::from_tenths(-75),
            unit: Unit::Celsius,
            channel: Channel::T1MinusT2,
            relative: true,
        }
    }

    #[test]
    fn test_channel_feed_delivers_in_order() {
        let (mut feed, mut rx) = ChannelFeed::new();
        feed.emit(record());
        feed.end();

        assert_eq!(rx.try_recv().unwrap(), FeedEvent::Measurement(record()));
        assert_eq!(rx.try_recv().unwrap(), FeedEvent::End);
    }

    #[test]
    fn test_emit_after_receiver_dropped() {
        let (mut feed, rx) = ChannelFeed::new();
        drop(rx);
        feed.emit(record());
        feed.end();
    }

    #[test]
    fn test_json_line() {
        let line = FeedEvent::Measurement(record()).to_json_line().unwrap();
        assert_eq!(
            line,
            r#"{"type":"measurement","temperature":{"value":-7.5,"tenths":-75},"unit":"celsius","channel":"T1-T2","relative":true}"#
        );
        assert_eq!(FeedEvent::End.to_json_line().unwrap(), r#"{"type":"end"}"#);
    }

    #[test]
    fn test_temperature_json_carries_degrees() {
        let json = serde_json::to_value(Temperature::from_tenths(256)).unwrap();
        assert_eq!(json["value"].as_f64().unwrap() as f32, 25.6);
        assert_eq!(json["tenths"], 256);

        let back: Temperature = serde_json::from_value(json).unwrap();
        assert_eq!(back, Temperature::from_tenths(256));
    }
}
