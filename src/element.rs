//! Element model: drawable objects and their truncated wire projections.
//!
//! DESIGN
//! ======
//! Elements are a closed sum type. The wire envelope is
//! `{"type": "<Kind>", "properties": {...}}`, which is exactly serde's
//! adjacently tagged representation, so decoding an unknown `type` fails
//! with serde's "unknown variant" error naming the offending tag.
//!
//! Two capabilities cut across the variants:
//! - Positionable (x, y, rotation): every shape, icon, image and text.
//! - Line (path, stroke, opacity, rotation): free and straight lines.
//!
//! Field copies for `update` are spelled out per kind in `assign`, with full
//! destructuring, so adding a field without copying it fails to compile.
//!
//! WIRE LENIENCY
//! =============
//! Browsers report geometry read back from DOM attributes, which arrive as
//! strings as often as numbers. Numeric properties accept both, and absent
//! properties fall back to defaults (`remove` and `toFront` envelopes carry
//! only the `uuid`).

use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// KIND
// =============================================================================

/// Concrete element kind. The variant name is the wire `type` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Rectangle,
    Circle,
    Ellipse,
    Icon,
    Image,
    Text,
    FreeLine,
    StraightLine,
}

impl ElementKind {
    pub const ALL: [ElementKind; 8] = [
        Self::Rectangle,
        Self::Circle,
        Self::Ellipse,
        Self::Icon,
        Self::Image,
        Self::Text,
        Self::FreeLine,
        Self::StraightLine,
    ];

    /// Resolve a wire `type` tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rectangle => "Rectangle",
            Self::Circle => "Circle",
            Self::Ellipse => "Ellipse",
            Self::Icon => "Icon",
            Self::Image => "Image",
            Self::Text => "Text",
            Self::FreeLine => "FreeLine",
            Self::StraightLine => "StraightLine",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// SHARED ATTRIBUTE GROUPS
// =============================================================================

/// Position and rotation shared by all positionable elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Placement {
    #[serde(deserialize_with = "lenient::int")]
    pub x: i32,
    #[serde(deserialize_with = "lenient::int")]
    pub y: i32,
    #[serde(deserialize_with = "lenient::int")]
    pub rotation_degree: i32,
}

/// Fill and border styling shared by rectangles, circles and ellipses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Outline {
    #[serde(deserialize_with = "lenient::string")]
    pub background_color: String,
    #[serde(deserialize_with = "lenient::string")]
    pub border_color: String,
    #[serde(deserialize_with = "lenient::int")]
    pub border_width: i32,
    #[serde(deserialize_with = "lenient::string")]
    pub border_style: String,
    #[serde(deserialize_with = "lenient::float")]
    pub background_opacity: f64,
    #[serde(deserialize_with = "lenient::float")]
    pub border_opacity: f64,
}

// =============================================================================
// CONCRETE KINDS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Rectangle {
    #[serde(deserialize_with = "lenient::string")]
    pub uuid: String,
    #[serde(flatten)]
    pub placement: Placement,
    #[serde(deserialize_with = "lenient::int")]
    pub width: i32,
    #[serde(deserialize_with = "lenient::int")]
    pub height: i32,
    #[serde(deserialize_with = "lenient::int")]
    pub corner_radius: i32,
    #[serde(flatten)]
    pub outline: Outline,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Circle {
    #[serde(deserialize_with = "lenient::string")]
    pub uuid: String,
    #[serde(flatten)]
    pub placement: Placement,
    #[serde(deserialize_with = "lenient::int")]
    pub radius: i32,
    #[serde(flatten)]
    pub outline: Outline,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Ellipse {
    #[serde(deserialize_with = "lenient::string")]
    pub uuid: String,
    #[serde(flatten)]
    pub placement: Placement,
    #[serde(rename = "hRadius", deserialize_with = "lenient::int")]
    pub h_radius: i32,
    #[serde(rename = "vRadius", deserialize_with = "lenient::int")]
    pub v_radius: i32,
    #[serde(flatten)]
    pub outline: Outline,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Icon {
    #[serde(deserialize_with = "lenient::string")]
    pub uuid: String,
    #[serde(flatten)]
    pub placement: Placement,
    #[serde(deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(deserialize_with = "lenient::float")]
    pub scale_factor: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Image {
    #[serde(deserialize_with = "lenient::string")]
    pub uuid: String,
    #[serde(flatten)]
    pub placement: Placement,
    #[serde(deserialize_with = "lenient::string")]
    pub url: String,
    #[serde(deserialize_with = "lenient::int")]
    pub width: i32,
    #[serde(deserialize_with = "lenient::int")]
    pub height: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Text {
    #[serde(deserialize_with = "lenient::string")]
    pub uuid: String,
    #[serde(flatten)]
    pub placement: Placement,
    #[serde(deserialize_with = "lenient::string")]
    pub text: String,
    #[serde(deserialize_with = "lenient::string")]
    pub font_family: String,
    #[serde(deserialize_with = "lenient::int")]
    pub font_size: i32,
    #[serde(deserialize_with = "lenient::string")]
    pub font_weight: String,
    #[serde(deserialize_with = "lenient::string")]
    pub font_style: String,
    #[serde(deserialize_with = "lenient::string")]
    pub color: String,
}

/// Body of both free and straight lines; the kind lives on the `Element` tag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Line {
    #[serde(deserialize_with = "lenient::string")]
    pub uuid: String,
    #[serde(deserialize_with = "lenient::int")]
    pub rotation_degree: i32,
    /// SVG path data.
    #[serde(deserialize_with = "lenient::string")]
    pub path: String,
    #[serde(deserialize_with = "lenient::string")]
    pub color: String,
    #[serde(deserialize_with = "lenient::int")]
    pub line_width: i32,
    #[serde(deserialize_with = "lenient::string")]
    pub line_style: String,
    #[serde(deserialize_with = "lenient::float")]
    pub opacity: f64,
}

// -----------------------------------------------------------------------------
// Explicit per-kind field copies. Identifiers are never copied.
// -----------------------------------------------------------------------------

impl Rectangle {
    fn assign(&mut self, src: &Self) {
        let Self { uuid: _, placement, width, height, corner_radius, outline } = src;
        self.placement = *placement;
        self.width = *width;
        self.height = *height;
        self.corner_radius = *corner_radius;
        self.outline.clone_from(outline);
    }
}

impl Circle {
    fn assign(&mut self, src: &Self) {
        let Self { uuid: _, placement, radius, outline } = src;
        self.placement = *placement;
        self.radius = *radius;
        self.outline.clone_from(outline);
    }
}

impl Ellipse {
    fn assign(&mut self, src: &Self) {
        let Self { uuid: _, placement, h_radius, v_radius, outline } = src;
        self.placement = *placement;
        self.h_radius = *h_radius;
        self.v_radius = *v_radius;
        self.outline.clone_from(outline);
    }
}

impl Icon {
    fn assign(&mut self, src: &Self) {
        let Self { uuid: _, placement, name, scale_factor } = src;
        self.placement = *placement;
        self.name.clone_from(name);
        self.scale_factor = *scale_factor;
    }
}

impl Image {
    fn assign(&mut self, src: &Self) {
        let Self { uuid: _, placement, url, width, height } = src;
        self.placement = *placement;
        self.url.clone_from(url);
        self.width = *width;
        self.height = *height;
    }
}

impl Text {
    fn assign(&mut self, src: &Self) {
        let Self { uuid: _, placement, text, font_family, font_size, font_weight, font_style, color } = src;
        self.placement = *placement;
        self.text.clone_from(text);
        self.font_family.clone_from(font_family);
        self.font_size = *font_size;
        self.font_weight.clone_from(font_weight);
        self.font_style.clone_from(font_style);
        self.color.clone_from(color);
    }
}

impl Line {
    fn assign(&mut self, src: &Self) {
        let Self { uuid: _, rotation_degree, path, color, line_width, line_style, opacity } = src;
        self.rotation_degree = *rotation_degree;
        self.path.clone_from(path);
        self.color.clone_from(color);
        self.line_width = *line_width;
        self.line_style.clone_from(line_style);
        self.opacity = *opacity;
    }
}

// =============================================================================
// ELEMENT
// =============================================================================

/// One drawable object on a whiteboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "properties")]
pub enum Element {
    Rectangle(Rectangle),
    Circle(Circle),
    Ellipse(Ellipse),
    Icon(Icon),
    Image(Image),
    Text(Text),
    FreeLine(Line),
    StraightLine(Line),
}

/// How much of an `update` could be applied to the stored element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    /// Same kind: every mutable field was copied.
    Complete,
    /// Kinds differ: only the shared capability fields were copied.
    Partial { stored: ElementKind, incoming: ElementKind },
}

impl Element {
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Rectangle(_) => ElementKind::Rectangle,
            Self::Circle(_) => ElementKind::Circle,
            Self::Ellipse(_) => ElementKind::Ellipse,
            Self::Icon(_) => ElementKind::Icon,
            Self::Image(_) => ElementKind::Image,
            Self::Text(_) => ElementKind::Text,
            Self::FreeLine(_) => ElementKind::FreeLine,
            Self::StraightLine(_) => ElementKind::StraightLine,
        }
    }

    #[must_use]
    pub fn uuid(&self) -> &str {
        match self {
            Self::Rectangle(e) => &e.uuid,
            Self::Circle(e) => &e.uuid,
            Self::Ellipse(e) => &e.uuid,
            Self::Icon(e) => &e.uuid,
            Self::Image(e) => &e.uuid,
            Self::Text(e) => &e.uuid,
            Self::FreeLine(e) | Self::StraightLine(e) => &e.uuid,
        }
    }

    /// Position and rotation, if this kind is positionable.
    #[must_use]
    pub fn as_positionable(&self) -> Option<&Placement> {
        match self {
            Self::Rectangle(e) => Some(&e.placement),
            Self::Circle(e) => Some(&e.placement),
            Self::Ellipse(e) => Some(&e.placement),
            Self::Icon(e) => Some(&e.placement),
            Self::Image(e) => Some(&e.placement),
            Self::Text(e) => Some(&e.placement),
            Self::FreeLine(_) | Self::StraightLine(_) => None,
        }
    }

    pub fn as_positionable_mut(&mut self) -> Option<&mut Placement> {
        match self {
            Self::Rectangle(e) => Some(&mut e.placement),
            Self::Circle(e) => Some(&mut e.placement),
            Self::Ellipse(e) => Some(&mut e.placement),
            Self::Icon(e) => Some(&mut e.placement),
            Self::Image(e) => Some(&mut e.placement),
            Self::Text(e) => Some(&mut e.placement),
            Self::FreeLine(_) | Self::StraightLine(_) => None,
        }
    }

    /// Line body, if this kind is a line.
    #[must_use]
    pub fn as_line(&self) -> Option<&Line> {
        match self {
            Self::FreeLine(line) | Self::StraightLine(line) => Some(line),
            _ => None,
        }
    }

    pub fn as_line_mut(&mut self) -> Option<&mut Line> {
        match self {
            Self::FreeLine(line) | Self::StraightLine(line) => Some(line),
            _ => None,
        }
    }

    /// Identity check used by the element store: same identifier, same kind.
    #[must_use]
    pub fn same_element(&self, other: &Element) -> bool {
        self.kind() == other.kind() && self.uuid() == other.uuid()
    }

    /// Human-readable label used in activity messages.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::Text(text) => format!("Text '{}'", text.text),
            Self::FreeLine(_) => "Free Line".to_owned(),
            Self::StraightLine(_) => "Straight Line".to_owned(),
            other => other.kind().as_str().to_owned(),
        }
    }

    /// Overwrite every mutable field with the values from `src`, keeping the
    /// identifier. When the kinds differ only the shared capability fields
    /// are copied.
    pub fn update_from(&mut self, src: &Element) -> CopyOutcome {
        if self.assign_same_kind(src) {
            return CopyOutcome::Complete;
        }
        if let (Some(dst), Some(src)) = (self.as_positionable_mut(), src.as_positionable()) {
            *dst = *src;
        }
        if let (Some(dst), Some(src)) = (self.as_line_mut(), src.as_line()) {
            dst.assign(src);
        }
        CopyOutcome::Partial { stored: self.kind(), incoming: src.kind() }
    }

    fn assign_same_kind(&mut self, src: &Element) -> bool {
        match (self, src) {
            (Self::Rectangle(dst), Self::Rectangle(src)) => dst.assign(src),
            (Self::Circle(dst), Self::Circle(src)) => dst.assign(src),
            (Self::Ellipse(dst), Self::Ellipse(src)) => dst.assign(src),
            (Self::Icon(dst), Self::Icon(src)) => dst.assign(src),
            (Self::Image(dst), Self::Image(src)) => dst.assign(src),
            (Self::Text(dst), Self::Text(src)) => dst.assign(src),
            (Self::FreeLine(dst), Self::FreeLine(src)) | (Self::StraightLine(dst), Self::StraightLine(src)) => {
                dst.assign(src);
            }
            _ => return false,
        }
        true
    }
}

// =============================================================================
// TRUNCATED ELEMENT
// =============================================================================

/// Extra data carried by a truncated projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Truncation {
    /// Identifier and kind only.
    Bare,
    /// New coordinates of a moved positionable element.
    Position { x: i32, y: i32 },
    /// New path of a moved line.
    Path(String),
}

/// Minimal projection of an element. Encodes under the kind tag of the
/// element it stands for, so receivers treat it as that kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruncatedElement {
    pub uuid: String,
    pub kind: ElementKind,
    pub detail: Truncation,
}

impl TruncatedElement {
    #[must_use]
    pub fn of(element: &Element) -> Self {
        Self { uuid: element.uuid().to_owned(), kind: element.kind(), detail: Truncation::Bare }
    }

    #[must_use]
    pub fn positioned(element: &Element, x: i32, y: i32) -> Self {
        Self { detail: Truncation::Position { x, y }, ..Self::of(element) }
    }

    #[must_use]
    pub fn line(element: &Element, path: impl Into<String>) -> Self {
        Self { detail: Truncation::Path(path.into()), ..Self::of(element) }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum TruncatedProperties<'a> {
    Bare { uuid: &'a str },
    Position { uuid: &'a str, x: i32, y: i32 },
    Path { uuid: &'a str, path: &'a str },
}

#[derive(Serialize)]
struct Envelope<'a> {
    #[serde(rename = "type")]
    kind: ElementKind,
    properties: TruncatedProperties<'a>,
}

impl Serialize for TruncatedElement {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let uuid = self.uuid.as_str();
        let properties = match &self.detail {
            Truncation::Bare => TruncatedProperties::Bare { uuid },
            Truncation::Position { x, y } => TruncatedProperties::Position { uuid, x: *x, y: *y },
            Truncation::Path(path) => TruncatedProperties::Path { uuid, path },
        };
        Envelope { kind: self.kind, properties }.serialize(serializer)
    }
}

/// Element carried by a server broadcast: either the full element or its
/// truncated projection. Both encode as the same envelope shape.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum BroadcastElement {
    Full(Element),
    Truncated(TruncatedElement),
}

impl BroadcastElement {
    #[must_use]
    pub fn uuid(&self) -> &str {
        match self {
            Self::Full(element) => element.uuid(),
            Self::Truncated(truncated) => &truncated.uuid,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Full(element) => element.kind(),
            Self::Truncated(truncated) => truncated.kind,
        }
    }
}

// =============================================================================
// LENIENT SCALARS
// =============================================================================

mod lenient {
    use serde::de::{Deserializer, Error};
    use serde::Deserialize;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Int(i64),
        Float(f64),
        Text(String),
        Bool(bool),
    }

    pub(super) fn int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
        let value = match Option::<Scalar>::deserialize(deserializer)? {
            None => return Ok(0),
            Some(Scalar::Int(v)) => v,
            Some(Scalar::Float(v)) if v.fract() == 0.0 => {
                #[allow(clippy::cast_possible_truncation)]
                {
                    v as i64
                }
            }
            Some(Scalar::Text(s)) if s.trim().is_empty() => return Ok(0),
            Some(Scalar::Text(s)) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| D::Error::custom(format!("expected integer, got {s:?}")))?,
            Some(Scalar::Float(v)) => return Err(D::Error::custom(format!("expected integer, got {v}"))),
            Some(Scalar::Bool(b)) => return Err(D::Error::custom(format!("expected integer, got {b}"))),
        };
        i32::try_from(value).map_err(|_| D::Error::custom(format!("integer out of range: {value}")))
    }

    pub(super) fn float<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Option::<Scalar>::deserialize(deserializer)? {
            None => Ok(0.0),
            #[allow(clippy::cast_precision_loss)]
            Some(Scalar::Int(v)) => Ok(v as f64),
            Some(Scalar::Float(v)) => Ok(v),
            Some(Scalar::Text(s)) if s.trim().is_empty() => Ok(0.0),
            Some(Scalar::Text(s)) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| D::Error::custom(format!("expected number, got {s:?}"))),
            Some(Scalar::Bool(b)) => Err(D::Error::custom(format!("expected number, got {b}"))),
        }
    }

    pub(super) fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        match Option::<Scalar>::deserialize(deserializer)? {
            None => Ok(String::new()),
            Some(Scalar::Text(s)) => Ok(s),
            Some(Scalar::Int(v)) => Ok(v.to_string()),
            Some(Scalar::Float(v)) => Ok(v.to_string()),
            Some(Scalar::Bool(b)) => Ok(b.to_string()),
        }
    }
}

#[cfg(test)]
#[path = "element_test.rs"]
mod tests;
