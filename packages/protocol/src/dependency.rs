//! Data model for the AV1 dependency descriptor RTP header extension.
//!
//! See <https://aomediacodec.github.io/av1-rtp-spec/#dependency-descriptor-rtp-header-extension>.
//! The extension is codec agnostic: any scalable video stream may carry it.
//! Parsing lives in the de-packetiser; this module only defines the parsed
//! shapes that travel with a [`crate::media::MediaPacket`].

use indexmap::IndexMap;

/// Sentinel layer id meaning "no restriction".
pub const MAX_LAYER_ID: u8 = u8::MAX;

/// Realistic encoders expose far fewer, the wire field is 5 bits.
pub const MAX_DECODE_TARGETS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerInfo {
    pub spatial: u8,
    pub temporal: u8,
}

impl LayerInfo {
    pub fn new(spatial: u8, temporal: u8) -> Self {
        Self { spatial, temporal }
    }
}

impl Default for LayerInfo {
    fn default() -> Self {
        Self {
            spatial: MAX_LAYER_ID,
            temporal: MAX_LAYER_ID,
        }
    }
}

/// Per-frame, per-decode-target relevance tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeTargetIndication {
    NotPresent,
    Discardable,
    Switch,
    Required,
}

/// Fixed capacity bitmap over decode targets, one bit per target.
///
/// Out of range reads are `false`, out of range writes are dropped, so a
/// bitmap built from one structure stays harmless against a shorter one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DtBitmap {
    bits: u32,
    len: u8,
}

impl DtBitmap {
    pub fn all_active(len: usize) -> Self {
        assert!(len <= MAX_DECODE_TARGETS, "{} should <= {}", len, MAX_DECODE_TARGETS);
        let bits = if len == MAX_DECODE_TARGETS { u32::MAX } else { (1u32 << len) - 1 };
        Self { bits, len: len as u8 }
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, index: usize) -> bool {
        index < self.len() && self.bits & (1 << index) != 0
    }

    pub fn set(&mut self, index: usize, active: bool) {
        if index < self.len() {
            if active {
                self.bits |= 1 << index;
            } else {
                self.bits &= !(1 << index);
            }
        }
    }
}

/// One entry of the template dependency structure's template catalogue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameDependencyTemplate {
    pub layer: LayerInfo,
    /// One indication per decode target.
    pub decode_target_indications: Vec<DecodeTargetIndication>,
    /// Offsets to referenced earlier frames.
    pub frame_diffs: Vec<u64>,
    /// One entry per chain, offset to the previous frame in that chain.
    pub frame_diffs_chains: Vec<u64>,
}

/// Per-stream catalogue of frame templates, decode target layer mappings and
/// chain protections. Signalled with key frames, then referenced by template
/// id from every descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateDependencyStructure {
    pub dts_count: usize,
    pub chains_count: usize,
    /// Layer coordinate of each decode target, `dts_count` entries.
    pub decode_target_layer_mapping: Vec<LayerInfo>,
    /// Protecting chain of each decode target, empty when the stream uses no chains.
    pub decode_target_protected_by_chain: Vec<usize>,
    /// Templates in wire order, keyed by template id.
    pub templates: IndexMap<u8, FrameDependencyTemplate>,
}

impl TemplateDependencyStructure {
    pub fn contains_template(&self, id: u8) -> bool {
        self.templates.contains_key(&id)
    }

    pub fn template(&self, id: u8) -> Option<&FrameDependencyTemplate> {
        self.templates.get(&id)
    }
}

/// Parsed per-packet dependency descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyDescriptor {
    pub start_of_frame: bool,
    pub end_of_frame: bool,
    /// Really a u6 on the wire.
    pub frame_dependency_template_id: u8,
    pub frame_number: u16,
    /// Per-packet overrides of the referenced template's lists.
    pub custom_decode_target_indications: Option<Vec<DecodeTargetIndication>>,
    pub custom_frame_diffs: Option<Vec<u64>>,
    pub custom_frame_diffs_chains: Option<Vec<u64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitmap_all_active() {
        let bitmap = DtBitmap::all_active(3);
        assert_eq!(bitmap.len(), 3);
        assert!(bitmap.get(0));
        assert!(bitmap.get(1));
        assert!(bitmap.get(2));
        assert!(!bitmap.get(3));
    }

    #[test]
    fn bitmap_set_clear() {
        let mut bitmap = DtBitmap::all_active(2);
        bitmap.set(1, false);
        assert!(bitmap.get(0));
        assert!(!bitmap.get(1));
        bitmap.set(1, true);
        assert!(bitmap.get(1));
    }

    #[test]
    fn bitmap_out_of_range_is_inert() {
        let mut bitmap = DtBitmap::all_active(2);
        bitmap.set(7, false);
        assert_eq!(bitmap, DtBitmap::all_active(2));
        assert!(!bitmap.get(7));
    }

    #[test]
    fn bitmap_full_capacity() {
        let bitmap = DtBitmap::all_active(MAX_DECODE_TARGETS);
        assert!(bitmap.get(31));
        assert!(!bitmap.get(32));
    }

    #[test]
    fn template_lookup() {
        let mut structure = TemplateDependencyStructure {
            dts_count: 1,
            chains_count: 0,
            decode_target_layer_mapping: vec![LayerInfo::new(0, 0)],
            decode_target_protected_by_chain: vec![],
            templates: Default::default(),
        };
        structure.templates.insert(3, FrameDependencyTemplate::default());
        assert!(structure.contains_template(3));
        assert!(!structure.contains_template(4));
        assert!(structure.template(3).is_some());
        assert!(structure.template(4).is_none());
    }
}
