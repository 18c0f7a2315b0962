use bigfold::engine::config::{
    DEFAULT_ALIGN_SPAN, DEFAULT_CHAIN_ID, DEFAULT_LINE_WIDTH, DEFAULT_OVERLAP_LENGTH,
    DEFAULT_SEGMENT_LENGTH, ShortFragmentPolicy,
};

pub struct DefaultsConfig {
    pub segment_length: usize,
    pub overlap_length: usize,
    pub line_width: usize,
    pub align_span: usize,
    pub combine: bool,
    pub chain_id: char,
    pub short_fragment_policy: ShortFragmentPolicy,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            segment_length: DEFAULT_SEGMENT_LENGTH,
            overlap_length: DEFAULT_OVERLAP_LENGTH,
            line_width: DEFAULT_LINE_WIDTH,
            align_span: DEFAULT_ALIGN_SPAN,
            combine: true,
            chain_id: DEFAULT_CHAIN_ID,
            short_fragment_policy: ShortFragmentPolicy::Skip,
        }
    }
}
