// REFLEX Viz - Per-Frame Modality Resolution
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Each resolver looks at one modality table for one frame and decides what
// its regions should show. Resolvers are pure: they return a resolution and
// the visualizer turns it into sink updates. A field error inside a resolver
// clears that modality and nothing else.

use super::layout::entity;
use super::sink::Visual;
use crate::config::VisualizationConfig;
use crate::data::lists::{
    au_entity_name, ACTION_UNITS, BODY_CLASS_ID, BODY_LANDMARKS, NEGATIVE_EMOTIONS, POSITIVE_EMOTIONS,
};
use crate::data::table::parse_number;
use crate::data::{FrameTable, Row};
use crate::error::FieldError;

/// Text shown in the gaze panel for frames without a gaze label.
pub const NO_GAZE_LABEL: &str = "Empty (Only on Failure Phases)";

const FACE_LANDMARKS: usize = 68;
const GAZE_VECTORS: usize = 2;
const BODY_JOINTS_3D: usize = 25;
const BODY_POINT_RADIUS: f32 = 5.0;

/// One update for one region.
#[derive(Debug, Clone, PartialEq)]
pub struct Emission {
    pub entity: String,
    pub visual: Visual,
}

impl Emission {
    pub fn new(entity: impl Into<String>, visual: Visual) -> Self {
        Self {
            entity: entity.into(),
            visual,
        }
    }

    pub fn clear(entity: impl Into<String>) -> Self {
        Self::new(entity, Visual::Clear)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayOptions {
    pub face_3d: bool,
    pub gaze_3d: bool,
    pub body_3d: bool,
    /// Minimum OpenFace confidence for face and gaze to be drawn.
    pub confidence_threshold: f64,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            face_3d: false,
            gaze_3d: false,
            body_3d: false,
            confidence_threshold: crate::config::DEFAULT_OPENFACE_CONFIDENCE,
        }
    }
}

impl From<&VisualizationConfig> for OverlayOptions {
    fn from(config: &VisualizationConfig) -> Self {
        Self {
            face_3d: config.face_3d,
            gaze_3d: config.gaze_3d,
            body_3d: config.body_3d,
            confidence_threshold: config.openface_confidence,
        }
    }
}

/// What a single region should do this frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Layer<T> {
    Show(T),
    Clear,
    /// Columns not exported for this participant; leave the region alone.
    Skip,
}

impl<T> Layer<T> {
    fn emission(&self, entity: &str, visual: impl FnOnce(&T) -> Visual) -> Option<Emission> {
        match self {
            Self::Show(value) => Some(Emission::new(entity, visual(value))),
            Self::Clear => Some(Emission::clear(entity)),
            Self::Skip => None,
        }
    }
}

/// Collect `count` points of `N` coordinates. A point with any missing or
/// NaN coordinate is dropped; no surviving points means clear. Skipped when
/// the export has no columns for any of the points.
fn collect_points<const N: usize>(
    row: &Row<'_>,
    count: usize,
    column: impl Fn(usize, usize) -> String,
) -> Layer<Vec<[f32; N]>> {
    if !(0..count).any(|i| row.has(&column(i, 0))) {
        return Layer::Skip;
    }

    let points: Vec<[f32; N]> = (0..count)
        .filter_map(|i| {
            let mut point = [0.0f32; N];
            for (axis, coord) in point.iter_mut().enumerate() {
                *coord = row.number(&column(i, axis))? as f32;
            }
            Some(point)
        })
        .collect();

    if points.is_empty() {
        Layer::Clear
    } else {
        Layer::Show(points)
    }
}

const AXES: [&str; 3] = ["x", "y", "z"];

// ─────────────────────────────────────────────────────────────────────────────
// OpenFace: face landmarks and gaze
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum FaceGaze {
    Cleared,
    Tracked {
        face: Layer<Vec<[f32; 2]>>,
        gaze: Layer<Vec<[f32; 2]>>,
        face_3d: Layer<Vec<[f32; 3]>>,
        gaze_3d: Layer<Vec<[f32; 3]>>,
    },
}

/// True when OpenFace tracked the face confidently enough to draw it.
pub fn passes_gate(row: &Row<'_>, threshold: f64) -> bool {
    row.flag("success") == Some(true) && row.number("confidence").is_some_and(|c| c >= threshold)
}

pub fn resolve_face_gaze(openface: &FrameTable, frame: i64, opts: &OverlayOptions) -> FaceGaze {
    let Some(row) = openface.select(frame) else {
        return FaceGaze::Cleared;
    };
    if !passes_gate(&row, opts.confidence_threshold) {
        return FaceGaze::Cleared;
    }

    let face = collect_points::<2>(&row, FACE_LANDMARKS, |i, axis| format!("{}_{}", AXES[axis], i));
    let gaze = collect_points::<2>(&row, GAZE_VECTORS, |i, axis| format!("gaze_{}_{}", i, AXES[axis]));

    let face_3d = if opts.face_3d {
        collect_points::<3>(&row, FACE_LANDMARKS, |i, axis| {
            format!("{}_{}", AXES[axis].to_ascii_uppercase(), i)
        })
    } else {
        Layer::Skip
    };
    let gaze_3d = if opts.gaze_3d {
        collect_points::<3>(&row, GAZE_VECTORS, |i, axis| format!("gaze_{}_{}", i, AXES[axis]))
    } else {
        Layer::Skip
    };

    FaceGaze::Tracked {
        face,
        gaze,
        face_3d,
        gaze_3d,
    }
}

impl FaceGaze {
    pub fn emissions(&self, opts: &OverlayOptions) -> Vec<Emission> {
        match self {
            Self::Cleared => {
                let mut out = vec![
                    Emission::clear(entity::VIDEO_GAZE),
                    Emission::clear(entity::VIDEO_FACE),
                ];
                if opts.gaze_3d {
                    out.push(Emission::clear(entity::GAZE_3D));
                }
                if opts.face_3d {
                    out.push(Emission::clear(entity::FACE_3D));
                }
                out
            }
            Self::Tracked {
                face,
                gaze,
                face_3d,
                gaze_3d,
            } => [
                face.emission(entity::VIDEO_FACE, |p| Visual::points_2d(p.clone())),
                gaze.emission(entity::VIDEO_GAZE, |p| Visual::points_2d(p.clone())),
                face_3d.emission(entity::FACE_3D, |p| Visual::points_3d(p.clone())),
                gaze_3d.emission(entity::GAZE_3D, |p| Visual::points_3d(p.clone())),
            ]
            .into_iter()
            .flatten()
            .collect(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Gaze target classification
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum GazeTarget {
    Label(String),
    NoData,
}

pub fn resolve_gaze_target(gaze: &FrameTable, frame: i64) -> GazeTarget {
    gaze.select(frame)
        .and_then(|row| row.text("Gaze"))
        .filter(|label| !label.is_empty())
        .map_or(GazeTarget::NoData, |label| GazeTarget::Label(label.to_string()))
}

impl GazeTarget {
    pub fn emission(&self) -> Emission {
        let text = match self {
            Self::Label(label) => format!("# {}", label),
            Self::NoData => NO_GAZE_LABEL.to_string(),
        };
        Emission::new(entity::GAZE_LABEL, Visual::Markdown(text))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Body pose
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Posture {
    CrossedArms,
    ArmsBehindBack,
    Unknown,
}

impl Posture {
    fn from_row(row: &Row<'_>) -> Self {
        if row.flag("Crossed Arms") == Some(true) {
            Self::CrossedArms
        } else if row.flag("Arms behind back") == Some(true) {
            Self::ArmsBehindBack
        } else {
            Self::Unknown
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            Self::CrossedArms => "# Crossed Arms",
            Self::ArmsBehindBack => "# Arms Behind Back",
            Self::Unknown => "# Unknown",
        }
    }
}

/// 2D keypoints in pixels, each tagged with its landmark id.
#[derive(Debug, Clone, PartialEq)]
pub struct Keypoints {
    pub points: Vec<[f32; 2]>,
    pub ids: Vec<u16>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BodyPose {
    Cleared,
    Posed {
        keypoints: Layer<Keypoints>,
        joints_3d: Layer<Vec<[f32; 3]>>,
        posture: Posture,
    },
}

/// Resolve the body pose, scaling normalized joints to a `width` x `height`
/// frame.
pub fn resolve_body(body: &FrameTable, frame: i64, width: u32, height: u32, opts: &OverlayOptions) -> BodyPose {
    let Some(row) = body.select(frame) else {
        return BodyPose::Cleared;
    };
    if row.number("11_x").is_none() || row.number("11_y").is_none() {
        return BodyPose::Cleared;
    }

    let mut points = Vec::with_capacity(BODY_LANDMARKS.len());
    let mut ids = Vec::with_capacity(BODY_LANDMARKS.len());
    for &(id, _) in BODY_LANDMARKS.iter() {
        let x = row.number(&format!("{}_x", id));
        let y = row.number(&format!("{}_y", id));
        if let (Some(x), Some(y)) = (x, y) {
            points.push([(x * width as f64) as f32, (y * height as f64) as f32]);
            ids.push(id);
        }
    }
    let keypoints = if points.is_empty() {
        Layer::Clear
    } else {
        Layer::Show(Keypoints { points, ids })
    };

    let joints_3d = if opts.body_3d {
        collect_points::<3>(&row, BODY_JOINTS_3D, |i, axis| format!("{}_3d_{}", i, AXES[axis]))
    } else {
        Layer::Skip
    };

    BodyPose::Posed {
        keypoints,
        joints_3d,
        posture: Posture::from_row(&row),
    }
}

impl BodyPose {
    pub fn emissions(&self, opts: &OverlayOptions) -> Vec<Emission> {
        match self {
            Self::Cleared => {
                let mut out = vec![Emission::clear(entity::VIDEO_BODY)];
                if opts.body_3d {
                    out.push(Emission::clear(entity::BODY_3D));
                }
                out
            }
            Self::Posed {
                keypoints,
                joints_3d,
                posture,
            } => {
                let mut out: Vec<Emission> = [
                    keypoints.emission(entity::VIDEO_BODY, |k| Visual::Points2D {
                        points: k.points.clone(),
                        class_id: Some(BODY_CLASS_ID),
                        keypoint_ids: Some(k.ids.clone()),
                        radius: Some(BODY_POINT_RADIUS),
                    }),
                    joints_3d.emission(entity::BODY_3D, |p| Visual::points_3d(p.clone())),
                ]
                .into_iter()
                .flatten()
                .collect();
                out.push(Emission::new(entity::BODY_LABEL, Visual::markdown(posture.headline())));
                out
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Valence / arousal
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Affect {
    Cleared,
    Scores { valence: f64, arousal: f64 },
}

pub fn resolve_affect(facetorch: &FrameTable, frame: i64) -> Affect {
    let read = |row: Row<'_>| -> Result<Affect, FieldError> {
        Ok(Affect::Scores {
            valence: row.require_number("Valence")?,
            arousal: row.require_number("Arousal")?,
        })
    };

    facetorch
        .select(frame)
        .map_or(Affect::Cleared, |row| read(row).unwrap_or(Affect::Cleared))
}

impl Affect {
    pub fn emissions(&self) -> Vec<Emission> {
        match *self {
            Self::Cleared => vec![Emission::clear(entity::AFFECT)],
            Self::Scores { valence, arousal } => vec![
                Emission::new(entity::AFFECT_VALENCE, Visual::Scalar(valence)),
                Emission::new(entity::AFFECT_AROUSAL, Visual::Scalar(arousal)),
            ],
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Hume: face box, categorical emotions and action units
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct HumeScores {
    /// `[x, y, width, height]` in pixels.
    pub bbox: [f32; 4],
    pub positive: Vec<(&'static str, f64)>,
    pub negative: Vec<(&'static str, f64)>,
    pub action_units: Vec<(&'static str, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Hume {
    Cleared,
    Detected(HumeScores),
}

/// Score from an optional column. Missing columns and blank or NaN cells are
/// skipped; text that is not a number is an error.
fn optional_score(row: &Row<'_>, column: &str) -> Result<Option<f64>, FieldError> {
    let Some(raw) = row.text(column) else {
        return Ok(None);
    };
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    parse_number(raw).map(Some).ok_or_else(|| FieldError::Unparseable {
        column: column.to_string(),
        value: raw.to_string(),
    })
}

fn scores(row: &Row<'_>, names: &[&'static str]) -> Result<Vec<(&'static str, f64)>, FieldError> {
    let mut out = Vec::with_capacity(names.len());
    for &name in names {
        if let Some(value) = optional_score(row, name)? {
            out.push((name, value));
        }
    }
    Ok(out)
}

pub fn resolve_hume(hume: &FrameTable, frame: i64) -> Hume {
    let Some(row) = hume.select(frame) else {
        return Hume::Cleared;
    };
    if row.number("x").is_none() {
        return Hume::Cleared;
    }

    let detected = || -> Result<HumeScores, FieldError> {
        let bbox = [
            row.require_number("x")? as f32,
            row.require_number("y")? as f32,
            row.require_number("w")? as f32,
            row.require_number("h")? as f32,
        ];
        Ok(HumeScores {
            bbox,
            positive: scores(&row, &POSITIVE_EMOTIONS)?,
            negative: scores(&row, &NEGATIVE_EMOTIONS)?,
            action_units: scores(&row, &ACTION_UNITS)?,
        })
    };

    detected().map_or(Hume::Cleared, Hume::Detected)
}

impl Hume {
    pub fn emissions(&self) -> Vec<Emission> {
        match self {
            Self::Cleared => vec![
                Emission::clear(entity::POSITIVE),
                Emission::clear(entity::NEGATIVE),
                Emission::clear(entity::AUS),
                Emission::clear(entity::VIDEO_BOX),
            ],
            Self::Detected(scores) => {
                let mut out = vec![Emission::new(entity::VIDEO_BOX, Visual::Box2D(scores.bbox))];
                let series = |root: &str, name: String, value: f64| {
                    Emission::new(format!("{}/{}", root, name), Visual::Scalar(value))
                };
                for &(name, value) in &scores.positive {
                    out.push(series(entity::POSITIVE, name.to_string(), value));
                }
                for &(name, value) in &scores.negative {
                    out.push(series(entity::NEGATIVE, name.to_string(), value));
                }
                for &(name, value) in &scores.action_units {
                    out.push(series(entity::AUS, au_entity_name(name), value));
                }
                out
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Table;

    fn frame_table(csv: &str, key: &str) -> FrameTable {
        FrameTable::index(Table::from_reader(csv.as_bytes()).unwrap(), key).unwrap()
    }

    fn openface_csv(rows: &[(i64, &str, f64, f64)]) -> String {
        let mut csv = String::from("frame,success,confidence,x_0,y_0,x_1,y_1,gaze_0_x,gaze_0_y,gaze_0_z\n");
        for (frame, success, confidence, x0) in rows {
            csv.push_str(&format!("{},{},{},{},5,NaN,6,0.1,0.2,0.3\n", frame, success, confidence, x0));
        }
        csv
    }

    #[test]
    fn test_face_below_threshold_is_cleared() {
        let table = frame_table(&openface_csv(&[(1, "1", 0.5, 10.0)]), "frame");
        let opts = OverlayOptions::default();
        let resolved = resolve_face_gaze(&table, 1, &opts);
        assert_eq!(resolved, FaceGaze::Cleared);

        let entities: Vec<_> = resolved.emissions(&opts).into_iter().map(|e| e.entity).collect();
        assert_eq!(entities, vec![entity::VIDEO_GAZE, entity::VIDEO_FACE]);
    }

    #[test]
    fn test_face_needs_success() {
        let table = frame_table(&openface_csv(&[(1, "0", 0.95, 10.0)]), "frame");
        assert_eq!(resolve_face_gaze(&table, 1, &OverlayOptions::default()), FaceGaze::Cleared);
    }

    #[test]
    fn test_face_uses_most_confident_row_and_drops_nan_points() {
        let table = frame_table(&openface_csv(&[(1, "1", 0.8, 10.0), (1, "1", 0.98, 20.0)]), "frame");
        let FaceGaze::Tracked { face, gaze, face_3d, .. } =
            resolve_face_gaze(&table, 1, &OverlayOptions::default())
        else {
            panic!("expected tracked face");
        };
        assert_eq!(face, Layer::Show(vec![[20.0, 5.0]]));
        // gaze_1_* columns are missing, so only the first vector survives.
        assert_eq!(gaze, Layer::Show(vec![[0.1, 0.2]]));
        assert_eq!(face_3d, Layer::Skip);
    }

    #[test]
    fn test_clear_set_includes_enabled_3d_regions() {
        let opts = OverlayOptions {
            face_3d: true,
            gaze_3d: true,
            ..OverlayOptions::default()
        };
        let entities: Vec<_> = FaceGaze::Cleared.emissions(&opts).into_iter().map(|e| e.entity).collect();
        assert!(entities.contains(&entity::FACE_3D.to_string()));
        assert!(entities.contains(&entity::GAZE_3D.to_string()));
    }

    #[test]
    fn test_gaze_target() {
        let table = frame_table("Frame,Gaze\n4,Robot\n5,\n", "Frame");
        assert_eq!(resolve_gaze_target(&table, 4).emission().visual, Visual::markdown("# Robot"));
        assert_eq!(resolve_gaze_target(&table, 5), GazeTarget::NoData);
        assert_eq!(resolve_gaze_target(&table, 6).emission().visual, Visual::markdown(NO_GAZE_LABEL));
    }

    fn body_csv(nan_joint: Option<u16>) -> String {
        let mut header = vec!["Frame".to_string(), "Crossed Arms".to_string(), "Arms behind back".to_string()];
        let mut values = vec!["7".to_string(), "False".to_string(), "True".to_string()];
        for &(id, _) in BODY_LANDMARKS.iter() {
            header.push(format!("{}_x", id));
            header.push(format!("{}_y", id));
            let x = if Some(id) == nan_joint { "NaN".to_string() } else { "0.5".to_string() };
            values.push(x);
            values.push("0.25".to_string());
        }
        format!("{}\n{}\n", header.join(","), values.join(","))
    }

    #[test]
    fn test_body_drops_nan_joint() {
        let table = frame_table(&body_csv(Some(15)), "Frame");
        let BodyPose::Posed { keypoints, posture, .. } =
            resolve_body(&table, 7, 640, 480, &OverlayOptions::default())
        else {
            panic!("expected pose");
        };
        let Layer::Show(keypoints) = keypoints else {
            panic!("expected keypoints");
        };
        assert_eq!(keypoints.points.len(), 13);
        assert!(!keypoints.ids.contains(&15));
        assert_eq!(keypoints.points[0], [320.0, 120.0]);
        assert_eq!(posture, Posture::ArmsBehindBack);
    }

    #[test]
    fn test_body_without_shoulder_is_cleared() {
        let table = frame_table(&body_csv(Some(11)), "Frame");
        let opts = OverlayOptions {
            body_3d: true,
            ..OverlayOptions::default()
        };
        let pose = resolve_body(&table, 7, 640, 480, &opts);
        assert_eq!(pose, BodyPose::Cleared);
        assert_eq!(pose.emissions(&opts).len(), 2);
    }

    #[test]
    fn test_body_3d_from_partial_export() {
        let mut lines = body_csv(None).lines().map(str::to_string).collect::<Vec<_>>();
        for &(id, _) in BODY_LANDMARKS.iter() {
            for axis in AXES {
                lines[0].push_str(&format!(",{}_3d_{}", id, axis));
                lines[1].push_str(",0.5");
            }
        }
        let table = frame_table(&format!("{}\n{}\n", lines[0], lines[1]), "Frame");
        let opts = OverlayOptions {
            body_3d: true,
            ..OverlayOptions::default()
        };

        let BodyPose::Posed { joints_3d, .. } = resolve_body(&table, 7, 640, 480, &opts) else {
            panic!("expected pose");
        };
        assert_eq!(joints_3d, Layer::Show(vec![[0.5; 3]; BODY_LANDMARKS.len()]));
    }

    #[test]
    fn test_body_3d_skipped_without_columns() {
        let table = frame_table(&body_csv(None), "Frame");
        let opts = OverlayOptions {
            body_3d: true,
            ..OverlayOptions::default()
        };
        let BodyPose::Posed { joints_3d, .. } = resolve_body(&table, 7, 640, 480, &opts) else {
            panic!("expected pose");
        };
        assert_eq!(joints_3d, Layer::Skip);
    }

    #[test]
    fn test_body_emissions_carry_keypoint_ids() {
        let table = frame_table(&body_csv(None), "Frame");
        let emissions = resolve_body(&table, 7, 100, 100, &OverlayOptions::default()).emissions(&OverlayOptions::default());
        let Visual::Points2D { class_id, keypoint_ids, radius, points } = &emissions[0].visual else {
            panic!("expected points");
        };
        assert_eq!(*class_id, Some(BODY_CLASS_ID));
        assert_eq!(keypoint_ids.as_ref().map(Vec::len), Some(points.len()));
        assert_eq!(*radius, Some(5.0));
        assert_eq!(emissions.last().unwrap().visual, Visual::markdown("# Arms Behind Back"));
    }

    #[test]
    fn test_affect() {
        let table = frame_table("Frame ID,Valence,Arousal\n1,0.3,-0.2\n2,bad,0.1\n", "Frame ID");
        assert_eq!(resolve_affect(&table, 1), Affect::Scores { valence: 0.3, arousal: -0.2 });
        assert_eq!(resolve_affect(&table, 2), Affect::Cleared);
        assert_eq!(resolve_affect(&table, 3).emissions(), vec![Emission::clear(entity::AFFECT)]);
    }

    #[test]
    fn test_hume_scores_and_box() {
        let table = frame_table(
            "Frame,x,y,w,h,Anger,Amusement,AU1 Inner Brow Raise\n1,10,20,30,40,0.5,NaN,0.1\n2,,,,,0.1,0.1,0.1\n",
            "Frame",
        );
        let emissions = resolve_hume(&table, 1).emissions();
        assert_eq!(emissions[0], Emission::new(entity::VIDEO_BOX, Visual::Box2D([10.0, 20.0, 30.0, 40.0])));
        let entities: Vec<_> = emissions.iter().map(|e| e.entity.as_str()).collect();
        assert!(entities.contains(&"Negative/Anger"));
        assert!(entities.contains(&"AUs/AU1InnerBrowRaise"));
        assert!(!entities.contains(&"Positive/Amusement"));

        assert_eq!(resolve_hume(&table, 2), Hume::Cleared);
    }

    #[test]
    fn test_hume_bad_score_clears_everything() {
        let table = frame_table("Frame,x,y,w,h,Anger\n1,10,20,30,40,high\n", "Frame");
        assert_eq!(resolve_hume(&table, 1).emissions().len(), 4);
    }
}
