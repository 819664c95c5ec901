//! Induction-loop detector definitions.

use std::path::{Path, PathBuf};

use crate::vocab::{induction_loop as attr, tag};
use crate::xml::{XmlElement, format_float};

/// A point detector on one lane, writing periodic aggregates to `file`.
#[derive(Clone, Debug, PartialEq)]
pub struct InductionLoop {
    id:             String,
    lane_id:        String,
    pos:            f64,
    file:           PathBuf,
    length:         Option<u32>,
    period:         Option<u32>,
    friendly_pos:   bool,
    vehicle_types:  Vec<String>,
    next_edges:     Vec<String>,
    detect_persons: Option<String>,
}

impl InductionLoop {
    pub fn new(id: impl Into<String>, lane_id: impl Into<String>, pos: f64, file: impl Into<PathBuf>) -> Self {
        Self {
            id:             id.into(),
            lane_id:        lane_id.into(),
            pos,
            file:           file.into(),
            length:         None,
            period:         None,
            friendly_pos:   false,
            vehicle_types:  Vec::new(),
            next_edges:     Vec::new(),
            detect_persons: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn lane_id(&self) -> &str {
        &self.lane_id
    }

    pub fn pos(&self) -> f64 {
        self.pos
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn friendly_pos(&self) -> bool {
        self.friendly_pos
    }

    pub fn with_length(self, length: u32) -> Self {
        Self { length: Some(length), ..self }
    }

    pub fn with_period(self, period: u32) -> Self {
        Self { period: Some(period), ..self }
    }

    /// Let the simulator move the detector onto the lane if `pos` overshoots.
    pub fn with_friendly_pos(self, friendly_pos: bool) -> Self {
        Self { friendly_pos, ..self }
    }

    pub fn with_vehicle_types<S: Into<String>>(self, types: impl IntoIterator<Item = S>) -> Self {
        Self { vehicle_types: types.into_iter().map(Into::into).collect(), ..self }
    }

    pub fn with_next_edges<S: Into<String>>(self, edges: impl IntoIterator<Item = S>) -> Self {
        Self { next_edges: edges.into_iter().map(Into::into).collect(), ..self }
    }

    pub fn with_detect_persons(self, mode: impl Into<String>) -> Self {
        Self { detect_persons: Some(mode.into()), ..self }
    }

    pub fn to_xml(&self) -> XmlElement {
        let joined = |v: &[String]| (!v.is_empty()).then(|| v.join(","));
        XmlElement::with_attrs(
            tag::INDUCTION_LOOP,
            [
                (attr::ID, self.id.clone()),
                (attr::LANE, self.lane_id.clone()),
                (attr::POS, format_float(self.pos)),
                (attr::FILE, self.file.display().to_string()),
            ],
            [
                (attr::LENGTH, self.length.map(|l| l.to_string())),
                (attr::PERIOD, self.period.map(|p| p.to_string())),
                (attr::FRIENDLY_POS, self.friendly_pos.then(|| "true".to_owned())),
                (attr::V_TYPES, joined(&self.vehicle_types)),
                (attr::NEXT_EDGES, joined(&self.next_edges)),
                (attr::DETECT_PERSONS, self.detect_persons.clone()),
            ],
        )
    }
}
