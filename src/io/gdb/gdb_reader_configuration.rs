//! Configuration for resolving a geodatabase catalog.

/// Configuration options for the geodatabase reader.
#[derive(Debug, Clone)]
pub struct GdbReaderConfiguration {
    /// Use the `.gdbtablx` companion index to seek to records when it is
    /// present and consistent with the table header. Default: `true`.
    ///
    /// When `false`, or when the index is unusable, records are found by
    /// walking the length prefixes of the table file.
    pub use_index: bool,

    /// Largest record payload, in bytes, the reader will allocate for.
    /// Default: 64 MiB.
    ///
    /// A record claiming more is treated as corrupt.
    pub max_record_size: u32,

    /// Largest field descriptor block, in bytes, the reader will allocate
    /// for. Default: 16 MiB.
    pub max_descriptor_size: u32,

    /// If `false`, item definitions are not parsed and every item carries
    /// empty metadata. Default: `true`.
    pub parse_metadata: bool,

    /// Parse item definitions on the rayon thread pool. Output order is
    /// unaffected. Default: `true`.
    pub parallel_metadata: bool,

    /// When `true`, items whose type GUID is not understood are kept in the
    /// tree with [`Kind::Unknown`](crate::Kind::Unknown). Default: `true`.
    pub keep_unknown_items: bool,
}

impl Default for GdbReaderConfiguration {
    fn default() -> Self {
        Self {
            use_index: true,
            max_record_size: 64 * 1024 * 1024,
            max_descriptor_size: 16 * 1024 * 1024,
            parse_metadata: true,
            parallel_metadata: true,
            keep_unknown_items: true,
        }
    }
}
