//! Marker catalogue
//!
//! Every literal the engine matches against lives here, so a generator
//! version that renames a struct or a built-in only needs a different
//! catalogue, not new code. The defaults match the output of the shader
//! graph generator.

use serde::{Deserialize, Serialize};

use crate::config::UV_CHANNELS;
use crate::region::RegionKind;

/// Literal markers used by the region tracker and the transforms
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleCatalogue {
    /// Opening marker for the vertex input struct
    pub attributes: String,
    /// Opening marker for the vertex description input struct
    pub vertex_description_inputs: String,
    /// Opening marker for the function that fills the description inputs
    pub build_vertex_description_inputs: String,
    /// Opening marker for the vertex description function
    pub vertex_description_function: String,
    /// Opening marker for the packed varyings struct
    pub packed_varyings: String,

    /// Macro guarding instanced inputs
    pub instancing_guard: String,
    /// Raw per-instance input field declaration
    pub raw_instance_field: String,
    /// Closing conditional directive
    pub conditional_end: String,

    /// Vertex index field in the description inputs
    pub vertex_index_field: String,
    /// Field declaration inserted after the vertex index field
    pub instance_index_field: String,
    /// Assignment of the vertex index inside the build function
    pub vertex_index_assignment: String,
    /// Assignment inserted after the vertex index assignment
    pub instance_index_assignment: String,
    /// Built-in accessor writing the instance id into its argument
    pub instance_id_accessor: String,
    /// Expression the accessor argument is assigned from
    pub instance_index_input: String,

    /// Type a flat packed varying must be declared with
    pub no_interpolation_type: String,
    /// Substring a packed varying name must contain to be made flat
    pub no_interpolation_marker: String,
    /// Qualifier inserted before the type
    pub no_interpolation_qualifier: String,

    /// Semantic names for UV channels 0..3
    pub uv_semantics: [String; UV_CHANNELS],
}

impl Default for RuleCatalogue {
    fn default() -> Self {
        Self {
            attributes: "struct Attributes".to_string(),
            vertex_description_inputs: "struct VertexDescriptionInputs".to_string(),
            build_vertex_description_inputs:
                "VertexDescriptionInputs BuildVertexDescriptionInputs(Attributes input)".to_string(),
            vertex_description_function:
                "VertexDescription VertexDescriptionFunction(VertexDescriptionInputs IN)".to_string(),
            packed_varyings: "struct PackedVaryings".to_string(),

            instancing_guard: "UNITY_ANY_INSTANCING_ENABLED".to_string(),
            raw_instance_field: "uint instanceID".to_string(),
            conditional_end: "#endif".to_string(),

            vertex_index_field: "uint VertexID;".to_string(),
            instance_index_field: "uint InstanceID;".to_string(),
            vertex_index_assignment: "output.VertexID =".to_string(),
            instance_index_assignment: "output.InstanceID = input.instanceID;".to_string(),
            instance_id_accessor: "UnityGetInstanceID_float".to_string(),
            instance_index_input: "IN.InstanceID".to_string(),

            no_interpolation_type: "float4".to_string(),
            no_interpolation_marker: "NoInterpolation".to_string(),
            no_interpolation_qualifier: "nointerpolation".to_string(),

            uv_semantics: [
                "TEXCOORD0".to_string(),
                "TEXCOORD1".to_string(),
                "TEXCOORD2".to_string(),
                "TEXCOORD3".to_string(),
            ],
        }
    }
}

impl RuleCatalogue {
    /// Opening marker for a region kind
    pub fn opening_marker(&self, kind: RegionKind) -> &str {
        match kind {
            RegionKind::Attributes => &self.attributes,
            RegionKind::VertexDescriptionInputs => &self.vertex_description_inputs,
            RegionKind::BuildVertexDescriptionInputs => &self.build_vertex_description_inputs,
            RegionKind::VertexDescriptionFunction => &self.vertex_description_function,
            RegionKind::PackedVaryings => &self.packed_varyings,
        }
    }

    /// Names of empty markers; an empty marker would match every line
    pub fn empty_markers(&self) -> Vec<&'static str> {
        let fields: [(&'static str, &str); 17] = [
            ("attributes", &self.attributes),
            ("vertex_description_inputs", &self.vertex_description_inputs),
            ("build_vertex_description_inputs", &self.build_vertex_description_inputs),
            ("vertex_description_function", &self.vertex_description_function),
            ("packed_varyings", &self.packed_varyings),
            ("instancing_guard", &self.instancing_guard),
            ("raw_instance_field", &self.raw_instance_field),
            ("conditional_end", &self.conditional_end),
            ("vertex_index_field", &self.vertex_index_field),
            ("instance_index_field", &self.instance_index_field),
            ("vertex_index_assignment", &self.vertex_index_assignment),
            ("instance_index_assignment", &self.instance_index_assignment),
            ("instance_id_accessor", &self.instance_id_accessor),
            ("instance_index_input", &self.instance_index_input),
            ("no_interpolation_type", &self.no_interpolation_type),
            ("no_interpolation_marker", &self.no_interpolation_marker),
            ("no_interpolation_qualifier", &self.no_interpolation_qualifier),
        ];
        let mut empty: Vec<&'static str> = fields
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if self.uv_semantics.iter().any(|s| s.trim().is_empty()) {
            empty.push("uv_semantics");
        }
        empty
    }
}
