//! Color-topology analysis
//!
//! Counts the distinct color labels a model uses and derives how many print
//! colors to offer for it.
//!
//! Two labelling schemes are collected per object and then unioned:
//!
//! - **Reference ids**: every `pid`, `p1`, `p2` and `p3` value on the object's
//!   triangles.
//! - **Paint labels**: every `paint_color` value. When at least one triangle of
//!   an object is painted, each unpainted sibling contributes the label
//!   `"default"`. An object with no painted triangles has no paint labels at all.
//!
//! The global color-zone count is the size of the union of every object's
//! labels, so a label shared by two objects counts once.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::defaults::{self, DEFAULT_COLOR_LABEL, MAX_RECOMMENDED_COLORS};
use crate::model::{Material, MaterialOrigin, ModelDocument, Object, Triangle, materials_of, objects_of};
use crate::stl::Geometry;

/// Color labels collected from one object's triangles
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColorSets {
    /// Union of `pid`/`p1`/`p2`/`p3` values
    pub reference_ids: BTreeSet<String>,
    /// Paint labels, including the synthetic `"default"`
    pub paint_labels: BTreeSet<String>,
}

impl ColorSets {
    /// Fold one triangle into the sets
    ///
    /// `object_is_painted` says whether any triangle of the same object carries
    /// a paint color; only then does an unpainted triangle add `"default"`.
    pub fn with_triangle(mut self, triangle: &Triangle, object_is_painted: bool) -> Self {
        self.reference_ids
            .extend(triangle.reference_ids().map(str::to_string));

        match &triangle.paint_color {
            Some(label) => {
                self.paint_labels.insert(label.clone());
            }
            None if object_is_painted => {
                self.paint_labels.insert(DEFAULT_COLOR_LABEL.to_string());
            }
            None => {}
        }

        self
    }

    /// Color sets of an object's triangles
    pub fn of_object(object: &Object) -> Self {
        let triangles = object.triangles();
        let painted = triangles.iter().any(|t| t.paint_color.is_some());
        triangles
            .iter()
            .fold(Self::default(), |sets, triangle| sets.with_triangle(triangle, painted))
    }

    /// All labels of both schemes
    pub fn labels(&self) -> impl Iterator<Item = &String> {
        self.reference_ids.union(&self.paint_labels)
    }

    /// Size of the union of both sets
    pub fn total(&self) -> usize {
        self.labels().count()
    }
}

/// Per-object analysis record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRecord {
    /// Object ID
    pub id: String,
    /// Object name
    pub name: String,
    /// Object type
    #[serde(rename = "type")]
    pub object_type: String,
    /// Number of triangles
    pub triangle_count: usize,
    /// Union of every triangle property reference
    pub reference_material_ids: BTreeSet<String>,
    /// Paint labels
    pub paint_color_labels: BTreeSet<String>,
    /// `|reference_material_ids ∪ paint_color_labels|`
    pub total_colors: usize,
}

impl ObjectRecord {
    /// Analyze one object
    pub fn from_object(object: &Object) -> Self {
        let sets = ColorSets::of_object(object);
        Self {
            id: object.id.clone(),
            name: object.name.clone(),
            object_type: object.object_type.clone(),
            triangle_count: object.triangle_count(),
            total_colors: sets.total(),
            reference_material_ids: sets.reference_ids,
            paint_color_labels: sets.paint_labels,
        }
    }

    /// Both label sets unioned
    pub fn color_labels(&self) -> impl Iterator<Item = &String> {
        self.reference_material_ids.union(&self.paint_color_labels)
    }
}

/// Summary of an object that has at least one triangle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshSummary {
    /// ID of the object this mesh belongs to
    pub object_id: String,
    /// Name of that object
    pub name: String,
    /// Number of triangles
    pub triangle_count: usize,
    /// Number of distinct reference ids
    pub reference_color_count: usize,
    /// Number of distinct paint labels
    pub paint_color_count: usize,
    /// Size of the union of both
    pub total_colors: usize,
}

impl MeshSummary {
    /// Summarize a record, `None` when it has no triangles
    pub fn from_record(record: &ObjectRecord) -> Option<Self> {
        (record.triangle_count > 0).then(|| Self {
            object_id: record.id.clone(),
            name: record.name.clone(),
            triangle_count: record.triangle_count,
            reference_color_count: record.reference_material_ids.len(),
            paint_color_count: record.paint_color_labels.len(),
            total_colors: record.total_colors,
        })
    }
}

/// Result of analyzing a model
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Materials: base materials then color-group entries
    pub materials: Vec<Material>,
    /// One record per object
    pub objects: Vec<ObjectRecord>,
    /// One summary per object with triangles
    pub meshes: Vec<MeshSummary>,
    /// Number of distinct labels across every object
    pub color_zones: usize,
    /// Whether any material was declared
    pub has_materials: bool,
    /// Whether any color-group entry was declared or any triangle is painted
    pub has_colors: bool,
}

/// Totals derived from an [`AnalysisResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    /// Number of materials
    pub total_materials: usize,
    /// Number of objects
    pub total_objects: usize,
    /// Number of objects with triangles
    pub total_meshes: usize,
    /// Distinct color labels
    pub color_zones: usize,
    /// `color_zones > 1 || total_meshes > 1`
    pub supports_multi_color: bool,
    /// `min(total_meshes, 4)`
    pub recommended_colors: usize,
}

/// Suggested number of print colors with a human-readable justification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    /// Suggested color count, between 1 and 4
    pub number_of_colors: usize,
    /// Why this count was chosen
    pub reason: String,
}

/// The complete diagnostic structure handed to collaborators
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// The analysis itself
    #[serde(flatten)]
    pub analysis: AnalysisResult,
    /// Derived totals
    pub summary: AnalysisSummary,
    /// Derived recommendation
    pub recommendation: Recommendation,
}

impl AnalysisResult {
    /// Build a result from materials and per-object records
    pub fn from_records(materials: Vec<Material>, objects: Vec<ObjectRecord>) -> Self {
        let meshes: Vec<MeshSummary> = objects.iter().filter_map(MeshSummary::from_record).collect();

        let zones = objects
            .iter()
            .flat_map(ObjectRecord::color_labels)
            .fold(BTreeSet::new(), |mut zones, label| {
                zones.insert(label.as_str());
                zones
            });

        let has_color_groups = materials
            .iter()
            .any(|m| m.origin == MaterialOrigin::ColorGroup);
        let has_paint = objects.iter().any(|o| !o.paint_color_labels.is_empty());

        Self {
            color_zones: zones.len(),
            has_materials: !materials.is_empty(),
            has_colors: has_color_groups || has_paint,
            materials,
            objects,
            meshes,
        }
    }

    /// Number of objects with at least one triangle
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Whether the model can be printed in more than one color
    pub fn supports_multi_color(&self) -> bool {
        self.color_zones > 1 || self.mesh_count() > 1
    }

    /// Recommended color count: one per mesh, capped at 4
    ///
    /// Deliberately ignores `color_zones`. It is a usability default that
    /// callers may override.
    pub fn recommended_colors(&self) -> usize {
        self.mesh_count().min(MAX_RECOMMENDED_COLORS)
    }

    /// Derived totals
    pub fn summary(&self) -> AnalysisSummary {
        AnalysisSummary {
            total_materials: self.materials.len(),
            total_objects: self.objects.len(),
            total_meshes: self.mesh_count(),
            color_zones: self.color_zones,
            supports_multi_color: self.supports_multi_color(),
            recommended_colors: self.recommended_colors(),
        }
    }

    /// Derived recommendation
    pub fn recommendation(&self) -> Recommendation {
        if self.supports_multi_color() {
            Recommendation {
                number_of_colors: self.recommended_colors().clamp(1, MAX_RECOMMENDED_COLORS),
                reason: format!(
                    "Model has {} separate meshes and {} color zones, suitable for multi-color printing",
                    self.mesh_count(),
                    self.color_zones
                ),
            }
        } else {
            Recommendation {
                number_of_colors: 1,
                reason: "Model appears to be single-color only".to_string(),
            }
        }
    }

    /// Bundle the result with its summary and recommendation
    pub fn to_report(&self) -> AnalysisReport {
        AnalysisReport {
            analysis: self.clone(),
            summary: self.summary(),
            recommendation: self.recommendation(),
        }
    }
}

/// Analyze a parsed 3MF document
pub fn analyze(doc: &ModelDocument) -> AnalysisResult {
    let objects = objects_of(doc).iter().map(ObjectRecord::from_object).collect();
    let result = AnalysisResult::from_records(materials_of(doc).to_vec(), objects);

    tracing::debug!(
        objects = result.objects.len(),
        meshes = result.mesh_count(),
        color_zones = result.color_zones,
        "analyzed model"
    );

    result
}

/// Analyze STL geometry: one uncolored mesh
pub fn analyze_geometry(geometry: &Geometry) -> AnalysisResult {
    let id = "1".to_string();
    let record = ObjectRecord {
        name: defaults::object_name(&id),
        id,
        object_type: defaults::DEFAULT_OBJECT_TYPE.to_string(),
        triangle_count: geometry.triangle_count(),
        reference_material_ids: BTreeSet::new(),
        paint_color_labels: BTreeSet::new(),
        total_colors: 0,
    };
    AnalysisResult::from_records(Vec::new(), vec![record])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Color, Mesh};

    fn object_with(id: &str, triangles: Vec<Triangle>) -> Object {
        let mut object = Object::new(id);
        let mut mesh = Mesh::new();
        mesh.triangles = triangles;
        object.mesh = Some(mesh);
        object
    }

    fn plain(count: usize) -> Vec<Triangle> {
        (0..count).map(|_| Triangle::new(0, 1, 2)).collect()
    }

    fn result_for(objects: &[Object]) -> AnalysisResult {
        AnalysisResult::from_records(
            Vec::new(),
            objects.iter().map(ObjectRecord::from_object).collect(),
        )
    }

    #[test]
    fn test_union_of_reference_and_paint_labels() {
        let object = object_with(
            "1",
            vec![
                Triangle::new(0, 1, 2).with_pid("1"),
                Triangle::new(0, 1, 2).with_pid("2"),
                Triangle::new(0, 1, 2).with_paint_color("red"),
                Triangle::new(0, 1, 2),
            ],
        );
        let record = ObjectRecord::from_object(&object);

        assert_eq!(
            record.reference_material_ids,
            BTreeSet::from(["1".to_string(), "2".to_string()])
        );
        assert_eq!(
            record.paint_color_labels,
            BTreeSet::from(["red".to_string(), "default".to_string()])
        );
        assert_eq!(record.total_colors, 4);
    }

    #[test]
    fn test_unpainted_object_has_no_default_label() {
        let object = object_with("1", vec![Triangle::new(0, 1, 2).with_pid("3"), Triangle::new(0, 1, 2)]);
        let record = ObjectRecord::from_object(&object);
        assert!(record.paint_color_labels.is_empty());
        assert_eq!(record.total_colors, 1);
    }

    #[test]
    fn test_default_label_is_per_object() {
        let painted = object_with("1", vec![Triangle::new(0, 1, 2).with_paint_color("4")]);
        let unpainted = object_with("2", plain(3));
        let result = result_for(&[painted, unpainted]);

        assert_eq!(result.objects[0].paint_color_labels.len(), 1);
        assert!(result.objects[1].paint_color_labels.is_empty());
        assert_eq!(result.color_zones, 1);
    }

    #[test]
    fn test_p_indices_are_collected() {
        let mut triangle = Triangle::new(0, 1, 2).with_pid("5");
        triangle.p1 = Some("0".to_string());
        triangle.p2 = Some("1".to_string());
        triangle.p3 = Some("0".to_string());
        let record = ObjectRecord::from_object(&object_with("1", vec![triangle]));
        assert_eq!(record.reference_material_ids.len(), 3);
    }

    #[test]
    fn test_color_zones_is_global_union() {
        let a = object_with(
            "1",
            vec![Triangle::new(0, 1, 2).with_pid("1"), Triangle::new(0, 1, 2).with_pid("2")],
        );
        let b = object_with(
            "2",
            vec![Triangle::new(0, 1, 2).with_pid("2"), Triangle::new(0, 1, 2).with_pid("3")],
        );
        let result = result_for(&[a, b]);
        assert_eq!(result.color_zones, 3);
    }

    #[test]
    fn test_meshes_skip_empty_objects() {
        let mut assembly = Object::new("9");
        assembly.mesh = None;
        let result = result_for(&[object_with("1", plain(2)), assembly, object_with("2", vec![])]);

        assert_eq!(result.objects.len(), 3);
        assert_eq!(result.mesh_count(), 1);
        assert_eq!(result.meshes[0].object_id, "1");
        assert_eq!(result.meshes[0].triangle_count, 2);
    }

    #[test]
    fn test_single_color_recommendation() {
        let result = result_for(&[object_with("1", plain(4))]);
        assert_eq!(result.color_zones, 0);
        assert!(!result.supports_multi_color());

        let recommendation = result.recommendation();
        assert_eq!(recommendation.number_of_colors, 1);
        assert!(recommendation.reason.contains("single-color only"));
    }

    #[test]
    fn test_multi_color_reason_states_counts() {
        let objects: Vec<Object> = (0..3)
            .map(|i| object_with(&i.to_string(), vec![Triangle::new(0, 1, 2).with_pid(i.to_string())]))
            .collect();
        let result = result_for(&objects);

        let recommendation = result.recommendation();
        assert_eq!(recommendation.number_of_colors, 3);
        assert!(recommendation.reason.contains("3 separate meshes"));
        assert!(recommendation.reason.contains("3 color zones"));
    }

    #[test]
    fn test_recommended_colors_capped() {
        for mesh_count in [0usize, 1, 2, 3, 4, 5, 8] {
            let objects: Vec<Object> = (0..mesh_count)
                .map(|i| object_with(&i.to_string(), vec![Triangle::new(0, 1, 2).with_pid(i.to_string())]))
                .collect();
            let result = result_for(&objects);
            assert_eq!(result.recommended_colors(), mesh_count.min(4));
            assert_eq!(result.summary().recommended_colors, mesh_count.min(4));
        }
    }

    #[test]
    fn test_single_mesh_many_zones_still_recommends_one() {
        let object = object_with(
            "1",
            vec![
                Triangle::new(0, 1, 2).with_paint_color("1"),
                Triangle::new(0, 1, 2).with_paint_color("2"),
            ],
        );
        let result = result_for(&[object]);
        assert!(result.supports_multi_color());
        assert_eq!(result.recommendation().number_of_colors, 1);
    }

    #[test]
    fn test_has_flags() {
        let materials = vec![Material::color_group("2:0", "Color Group 2 #1", Color::rgb(1, 1, 1))];
        let result = AnalysisResult::from_records(materials, Vec::new());
        assert!(result.has_materials);
        assert!(result.has_colors);

        let materials = vec![Material::base("1", "Red", Color::rgb(255, 0, 0))];
        let result = AnalysisResult::from_records(materials, Vec::new());
        assert!(result.has_materials);
        assert!(!result.has_colors);
    }

    #[test]
    fn test_analyze_geometry() {
        let geometry = Geometry {
            positions: vec![0.0; 18],
            normals: vec![0.0; 18],
        };
        let result = analyze_geometry(&geometry);
        assert_eq!(result.mesh_count(), 1);
        assert_eq!(result.meshes[0].triangle_count, 2);
        assert_eq!(result.color_zones, 0);
        assert!(!result.supports_multi_color());
    }
}
