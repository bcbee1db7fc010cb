use std::io;
use std::sync::Arc;

use super::WriteSink;

/// Forwards every record to each member sink, in order.
///
/// Writes are best-effort: every member is attempted even when an earlier one
/// fails, and the first failure is reported afterwards.
pub struct TeeSink {
    members: Vec<Arc<dyn WriteSink>>,
}

impl TeeSink {
    #[must_use]
    pub fn new(members: Vec<Arc<dyn WriteSink>>) -> Self {
        Self { members }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    fn for_each(&self, op: impl Fn(&dyn WriteSink) -> io::Result<()>) -> io::Result<()> {
        let mut first_err = None;
        for member in &self.members {
            if let Err(e) = op(member.as_ref()) {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

impl WriteSink for TeeSink {
    fn write_record(&self, record: &[u8]) -> io::Result<()> {
        self.for_each(|sink| sink.write_record(record))
    }

    fn sync(&self) -> io::Result<()> {
        self.for_each(|sink| sink.sync())
    }
}

impl std::fmt::Debug for TeeSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeeSink")
            .field("members", &self.members.len())
            .finish()
    }
}
