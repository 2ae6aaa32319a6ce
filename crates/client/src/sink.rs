//! Output sink: frames extracted records as one valid JSON array.

use std::io::Write;

use filterfeed_core::StreamRecord;

use crate::error::FeedError;

/// Receives records extracted by the stream session.
pub trait RecordSink: Send {
    /// Called once before the first session. Default no-op.
    fn open(&mut self) -> Result<(), FeedError> {
        Ok(())
    }

    fn write_record(&mut self, record: &StreamRecord) -> Result<(), FeedError>;

    /// Called when a session ends, on every exit path (end of stream,
    /// transport failure, or stop).
    fn session_complete(&mut self) -> Result<(), FeedError>;

    /// Called once when the supervisor stops. Default no-op.
    fn close(&mut self) -> Result<(), FeedError> {
        Ok(())
    }
}

/// Frames records as a single syntactically valid JSON array.
///
/// The framer outlives individual sessions: comma placement is tracked
/// for the whole process lifetime, so the concatenated output of many
/// reconnects is still exactly one array with no trailing comma. Every
/// element is flushed as soon as it is written, so a consumer tailing
/// the stream sees records as they arrive. A hard kill before `close`
/// leaves an incomplete-but-recoverable document; that is the accepted
/// limitation, not something masked here.
pub struct JsonArrayFramer<W: Write + Send> {
    out: W,
    has_emitted: bool,
    at_line_start: bool,
}

impl<W: Write + Send> JsonArrayFramer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            has_emitted: false,
            at_line_start: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> RecordSink for JsonArrayFramer<W> {
    fn open(&mut self) -> Result<(), FeedError> {
        self.out.write_all(b"[\n")?;
        self.out.flush()?;
        self.at_line_start = true;
        Ok(())
    }

    fn write_record(&mut self, record: &StreamRecord) -> Result<(), FeedError> {
        if self.has_emitted {
            if !self.at_line_start {
                self.out.write_all(b"\n")?;
            }
            self.out.write_all(b",\n")?;
        }
        serde_json::to_writer(&mut self.out, record)?;
        self.out.flush()?;
        self.has_emitted = true;
        self.at_line_start = false;
        Ok(())
    }

    fn session_complete(&mut self) -> Result<(), FeedError> {
        // Blank line after the last record of the session.
        if self.has_emitted && !self.at_line_start {
            self.out.write_all(b"\n")?;
            self.out.flush()?;
            self.at_line_start = true;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), FeedError> {
        self.out.write_all(b"]")?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, text: &str) -> StreamRecord {
        StreamRecord {
            id: id.into(),
            text: text.into(),
        }
    }

    fn output(framer: JsonArrayFramer<Vec<u8>>) -> String {
        String::from_utf8(framer.into_inner()).unwrap()
    }

    #[test]
    fn empty_run_is_bracket_pair() {
        let mut framer = JsonArrayFramer::new(Vec::new());
        framer.open().unwrap();
        framer.close().unwrap();
        assert_eq!(output(framer), "[\n]");
    }

    #[test]
    fn two_records_one_session() {
        let mut framer = JsonArrayFramer::new(Vec::new());
        framer.open().unwrap();
        framer.write_record(&record("1", "a")).unwrap();
        framer.write_record(&record("2", "b")).unwrap();
        framer.session_complete().unwrap();
        framer.close().unwrap();
        assert_eq!(
            output(framer),
            "[\n{\"id\":\"1\",\"text\":\"a\"}\n,\n{\"id\":\"2\",\"text\":\"b\"}\n]"
        );
    }

    #[test]
    fn records_across_sessions_still_one_array() {
        let mut framer = JsonArrayFramer::new(Vec::new());
        framer.open().unwrap();
        framer.write_record(&record("1", "a")).unwrap();
        framer.session_complete().unwrap();
        framer.write_record(&record("2", "b")).unwrap();
        framer.session_complete().unwrap();
        framer.close().unwrap();
        assert_eq!(
            output(framer),
            "[\n{\"id\":\"1\",\"text\":\"a\"}\n,\n{\"id\":\"2\",\"text\":\"b\"}\n]"
        );
    }

    #[test]
    fn session_without_records_adds_nothing() {
        let mut framer = JsonArrayFramer::new(Vec::new());
        framer.open().unwrap();
        framer.session_complete().unwrap();
        framer.session_complete().unwrap();
        framer.close().unwrap();
        assert_eq!(output(framer), "[\n]");
    }

    #[test]
    fn output_parses_as_json_array_of_all_records() {
        let mut framer = JsonArrayFramer::new(Vec::new());
        framer.open().unwrap();
        for i in 0..5 {
            framer
                .write_record(&record(&i.to_string(), "text"))
                .unwrap();
            if i % 2 == 0 {
                framer.session_complete().unwrap();
            }
        }
        framer.session_complete().unwrap();
        framer.close().unwrap();

        let parsed: Vec<StreamRecord> = serde_json::from_str(&output(framer)).unwrap();
        assert_eq!(parsed.len(), 5);
        assert_eq!(parsed[4].id, "4");
    }
}
