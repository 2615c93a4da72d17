//! Dependency descriptor selector
//!
//! This selector forwards only the packets that keep the substream decodable
//! at the subscriber requested spatial and temporal caps. Every decision
//! comes from the dependency descriptor metadata: frame diffs tell which
//! earlier frames a frame needs, chains tell whether a decode target survived
//! earlier losses, decode target indications tell whether the frame even
//! carries data for a target.
//!
//! On forward it restamps the rtp marker in place so the receiver sees
//! end-of-frame on the highest forwarded spatial layer, and when caps prune
//! decode targets it projects a corrected active decode targets bitmap for
//! the packetiser to restamp into the outgoing descriptor.
//!
//! Note that, in a descriptor stream each spatial layer frame has its own
//! frame number, and only fully forwarded frames count as references for
//! later ones.

use media_forward_protocol::{
    dependency::{DecodeTargetIndication, DtBitmap, LayerInfo, MAX_LAYER_ID},
    media::{MediaCodec, MediaPacket},
};
use media_forward_utils::FrameHistory;

use super::FrameNoExtend;

pub struct Selector {
    codec: MediaCodec,
    spatial: u8,
    temporal: u8,
    current_frame: Option<u64>,
    forwarded_frames: FrameHistory,
    frame_no_extend: FrameNoExtend,
    forwarded_decode_targets: Option<DtBitmap>,
    waiting_for_intra: bool,
}

impl Selector {
    pub fn new(codec: MediaCodec) -> Self {
        Self {
            codec,
            spatial: MAX_LAYER_ID,
            temporal: MAX_LAYER_ID,
            current_frame: None,
            forwarded_frames: FrameHistory::default(),
            frame_no_extend: FrameNoExtend::default(),
            forwarded_decode_targets: None,
            waiting_for_intra: false,
        }
    }

    /// Takes effect on the next packet, no state is flushed.
    pub fn select_spatial_layer(&mut self, id: u8) {
        self.spatial = id;
    }

    /// Takes effect on the next packet, no state is flushed.
    pub fn select_temporal_layer(&mut self, id: u8) {
        self.temporal = id;
    }

    pub fn codec(&self) -> MediaCodec {
        self.codec
    }

    pub fn spatial_layer_id(&self) -> u8 {
        self.spatial
    }

    pub fn temporal_layer_id(&self) -> u8 {
        self.temporal
    }

    pub fn is_waiting_for_intra(&self) -> bool {
        self.waiting_for_intra
    }

    /// Corrected active decode targets to restamp into the outgoing
    /// descriptor, present only while the caps prune targets the sender still
    /// advertises as active.
    pub fn forwarded_decode_targets(&self) -> Option<&DtBitmap> {
        self.forwarded_decode_targets.as_ref()
    }

    /// Layer coordinate of the packet referenced template. Pure, does not
    /// touch selection state.
    pub fn layer_ids(pkt: &MediaPacket) -> LayerInfo {
        if let (Some(dd), Some(structure)) = (pkt.dd.as_ref(), pkt.structure.as_deref()) {
            if let Some(template) = structure.template(dd.frame_dependency_template_id) {
                return template.layer;
            }
        }
        LayerInfo::default()
    }

    /// Decide whether to forward this packet. `Some(())` forwards, and the
    /// packet marker may have been restamped in place. `None` drops.
    pub fn select(&mut self, pkt: &mut MediaPacket) -> Option<()> {
        let Some(dd) = pkt.dd.as_ref() else {
            log::warn!("[DdSvcSelector] packet {} without dependency descriptor", pkt.seq);
            self.waiting_for_intra = true;
            return None;
        };

        let Some(structure) = pkt.structure.as_deref() else {
            log::warn!("[DdSvcSelector] packet {} without template dependency structure", pkt.seq);
            self.waiting_for_intra = true;
            return None;
        };

        let ext_frame = match self.frame_no_extend.generate(dd.frame_number as u64) {
            Some(ext_frame) => ext_frame,
            None => {
                log::debug!("[DdSvcSelector] frame number {} under previous cycle base => drop", dd.frame_number);
                return None;
            }
        };

        // wait for the start of a frame before forwarding anything
        let current_frame = match self.current_frame {
            Some(current_frame) => current_frame,
            None => {
                if !dd.start_of_frame {
                    self.waiting_for_intra = true;
                    return None;
                }
                log::debug!("[DdSvcSelector] got first frame start {ext_frame}");
                self.current_frame = Some(ext_frame);
                ext_frame
            }
        };

        let Some(template) = structure.template(dd.frame_dependency_template_id) else {
            log::warn!(
                "[DdSvcSelector] current templates don't contain reference template {}",
                dd.frame_dependency_template_id
            );
            return None;
        };

        let decode_target_indications = dd.custom_decode_target_indications.as_ref().unwrap_or(&template.decode_target_indications);
        let frame_diffs = dd.custom_frame_diffs.as_ref().unwrap_or(&template.frame_diffs);
        let frame_diffs_chains = dd.custom_frame_diffs_chains.as_ref().unwrap_or(&template.frame_diffs_chains);

        let mut decodable = true;

        // only full frames are forwarded, a frame jump without start_of_frame
        // means the tail of the previous frame never arrived
        if ext_frame > current_frame && !dd.start_of_frame {
            decodable = false;
        }
        self.current_frame = Some(current_frame.max(ext_frame));

        for diff in frame_diffs {
            let referenced = ext_frame.wrapping_sub(*diff);
            if referenced != ext_frame && !self.forwarded_frames.contains(referenced) {
                decodable = false;
                break;
            }
        }

        log::trace!("[DdSvcSelector] frame {ext_frame} decodable {decodable}");

        // content adaptation needs its own view of the active decode targets
        if self.spatial != MAX_LAYER_ID || self.temporal != MAX_LAYER_ID {
            self.forwarded_decode_targets = Some(match pkt.active_decode_targets {
                Some(active) => active,
                None => DtBitmap::all_active(structure.dts_count),
            });
        }

        let active_decode_targets = pkt.active_decode_targets;
        let mut selected = None;
        let mut needs_forwarded_decode_targets = false;

        // high decode targets first, high targets are high layers
        for decode_target in (0..structure.dts_count).rev() {
            let layer = structure.decode_target_layer_mapping.get(decode_target).copied().unwrap_or_default();

            log::trace!("[DdSvcSelector] trying decode target {decode_target} layer S{}T{}", layer.spatial, layer.temporal);

            if layer.spatial > self.spatial || layer.temporal > self.temporal {
                // over the caps, disable in our projection
                if let Some(forwarded) = self.forwarded_decode_targets.as_mut() {
                    forwarded.set(decode_target, false);
                }
                needs_forwarded_decode_targets = true;
                continue;
            }

            if let Some(active) = &active_decode_targets {
                if !active.get(decode_target) {
                    // sender already disabled it, nothing to project
                    continue;
                }
            }

            if structure.decode_target_protected_by_chain.is_empty() {
                selected = Some((decode_target, layer));
                break;
            }

            let Some(chain) = structure.decode_target_protected_by_chain.get(decode_target).copied() else {
                continue;
            };

            let Some(chain_diff) = frame_diffs_chains.get(chain).copied() else {
                continue;
            };

            let prev_frame_in_chain = ext_frame.wrapping_sub(chain_diff);
            if prev_frame_in_chain != 0 && prev_frame_in_chain != ext_frame && !self.forwarded_frames.contains(prev_frame_in_chain) {
                // chain is broken at this target, try next
                continue;
            }

            log::trace!("[DdSvcSelector] frame {ext_frame} target {decode_target} chain {chain} intact");
            selected = Some((decode_target, layer));
            break;
        }

        if !needs_forwarded_decode_targets {
            // sender mask is already correct, do not override it
            self.forwarded_decode_targets = None;
        }

        let Some((decode_target, selected_layer)) = selected else {
            log::debug!("[DdSvcSelector] no decode target available under S{}T{}", self.spatial, self.temporal);
            self.waiting_for_intra = true;
            return None;
        };

        let Some(dti) = decode_target_indications.get(decode_target).copied() else {
            log::warn!("[DdSvcSelector] no decode target indication for target {decode_target}");
            self.waiting_for_intra = true;
            return None;
        };

        if dti == DecodeTargetIndication::NotPresent {
            log::debug!("[DdSvcSelector] drop packet {}, frame {ext_frame} not present in target {decode_target}", pkt.seq);
            return None;
        }

        if !decodable {
            // a discardable frame can be dropped without breaking anyone
            self.waiting_for_intra = dti != DecodeTargetIndication::Discardable;
            log::warn!("[DdSvcSelector] drop packet {}, frame {ext_frame} not decodable", pkt.seq);
            return None;
        }

        // marker belongs on the last packet of the highest forwarded spatial layer
        let mark = pkt.marker || (dd.end_of_frame && selected_layer.spatial == template.layer.spatial);
        let end_of_frame = dd.end_of_frame;
        let template_layer = template.layer;

        self.waiting_for_intra = false;

        if end_of_frame {
            // only fully forwarded frames count as references
            self.forwarded_frames.add(ext_frame);
        }

        pkt.marker = mark;

        log::trace!(
            "[DdSvcSelector] accepting packet {} mark {mark} layer S{}T{}",
            pkt.seq,
            template_layer.spatial,
            template_layer.temporal
        );

        Some(())
    }
}
