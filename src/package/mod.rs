//! Archive sinks, archive layouts, progress reporting and the packaging pipeline.

pub(crate) mod archive;
pub(crate) mod layout;
pub(crate) mod pipeline;
pub(crate) mod progress;
pub(crate) mod tar;
