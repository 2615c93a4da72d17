use std::sync::Arc;

use derivative::Derivative;

use crate::dependency::{DependencyDescriptor, DtBitmap, TemplateDependencyStructure};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    pub fn is_audio(&self) -> bool {
        matches!(self, MediaKind::Audio)
    }

    pub fn is_video(&self) -> bool {
        matches!(self, MediaKind::Video)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaCodec {
    Opus,
    H264,
    Vp8,
    Vp9,
    Av1,
}

#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct MediaPacket {
    pub pt: u8,
    pub ts: u32,
    /// Extended RTP sequence number, already rolled over by the transport.
    pub seq: u64,
    pub marker: bool,
    pub nackable: bool,
    /// Parsed dependency descriptor extension, when the packet carries one.
    pub dd: Option<DependencyDescriptor>,
    /// Template dependency structure current at this frame. The de-packetiser
    /// owns it and attaches a shared handle per fan-out; selectors read it
    /// during one call and keep nothing.
    pub structure: Option<Arc<TemplateDependencyStructure>>,
    /// Active decode targets from the most recent descriptor that carried them.
    pub active_decode_targets: Option<DtBitmap>,
    #[derivative(Debug = "ignore")]
    pub data: Vec<u8>,
}
