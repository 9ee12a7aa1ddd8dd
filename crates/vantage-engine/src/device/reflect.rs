//! WGSL front end: parse, validate and reflect the binding interface of a stage.
//!
//! Programs address their inputs by name the way GL programs do. Names map to:
//! - attributes: the `@location` of a vertex entry-point input
//! - uniforms: the byte offset of a member of the `@group(0) @binding(0)` block
//! - textures: the `@binding` of a `@group(1)` image

use std::collections::HashMap;

use naga::{AddressSpace, Binding, Module, TypeInner};

use super::{BindingKind, ShaderStage};

/// Size of one per-draw uniform slot. Also the dynamic offset alignment.
pub(crate) const UNIFORM_SLOT_SIZE: u32 = 256;

pub(crate) const UNIFORM_GROUP: u32 = 0;
pub(crate) const TEXTURE_GROUP: u32 = 1;

/// Members of the uniform block, by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct UniformBlock {
    pub members: HashMap<String, u32>,
    /// Byte size of the block, padding included.
    pub size: u32,
}

/// Reflected interface of one compiled stage.
#[derive(Debug, Clone)]
pub(crate) struct StageInterface {
    pub stage: ShaderStage,
    pub entry_point: String,
    /// Named `@location` inputs.
    pub inputs: HashMap<String, u32>,
    /// `@location` outputs.
    pub outputs: Vec<u32>,
    pub uniforms: Option<UniformBlock>,
    /// Texture bindings in the texture group, by name.
    pub textures: HashMap<String, u32>,
}

/// Interface of a linked program.
#[derive(Debug, Clone, Default)]
pub(crate) struct ProgramInterface {
    pub attributes: HashMap<String, u32>,
    pub uniforms: UniformBlock,
    pub textures: HashMap<String, u32>,
}

impl ProgramInterface {
    pub fn location(&self, name: &str, kind: BindingKind) -> Option<u32> {
        match kind {
            BindingKind::Attribute => self.attributes.get(name).copied(),
            BindingKind::Uniform => self
                .uniforms
                .members
                .get(name)
                .or_else(|| self.textures.get(name))
                .copied(),
        }
    }

    pub fn samples_textures(&self) -> bool {
        !self.textures.is_empty()
    }

    /// Attribute locations the vertex stage reads, ascending.
    pub fn required_attributes(&self) -> Vec<u32> {
        let mut locations: Vec<u32> = self.attributes.values().copied().collect();
        locations.sort_unstable();
        locations
    }
}

/// Parses and validates `source`, then reflects the entry point of `stage`.
///
/// Errors carry a human-readable diagnostic log.
pub(crate) fn reflect_stage(stage: ShaderStage, source: &str) -> Result<StageInterface, String> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| e.emit_to_string(source))?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::empty(),
    );
    validator
        .validate(&module)
        .map_err(|e| e.emit_to_string(source))?;

    let wanted = match stage {
        ShaderStage::Vertex => naga::ShaderStage::Vertex,
        ShaderStage::Fragment => naga::ShaderStage::Fragment,
    };
    let entry = module
        .entry_points
        .iter()
        .find(|ep| ep.stage == wanted)
        .ok_or_else(|| format!("no {stage} entry point in module"))?;

    let mut inputs = HashMap::new();
    for arg in &entry.function.arguments {
        match (&arg.binding, &arg.name) {
            (Some(Binding::Location { location, .. }), Some(name)) => {
                inputs.insert(name.clone(), *location);
            }
            (None, _) => collect_struct_locations(&module, arg.ty, |name, location| {
                inputs.insert(name.to_owned(), location);
            }),
            _ => {}
        }
    }

    let mut outputs = Vec::new();
    if let Some(result) = &entry.function.result {
        match &result.binding {
            Some(Binding::Location { location, .. }) => outputs.push(*location),
            Some(_) => {}
            None => collect_struct_locations(&module, result.ty, |_, location| {
                outputs.push(location)
            }),
        }
    }
    outputs.sort_unstable();

    let mut uniforms = None;
    let mut textures = HashMap::new();
    for (_, global) in module.global_variables.iter() {
        let (Some(binding), Some(name)) = (&global.binding, &global.name) else {
            continue;
        };
        match global.space {
            AddressSpace::Uniform if binding.group == UNIFORM_GROUP && binding.binding == 0 => {
                if let TypeInner::Struct { members, span } = &module.types[global.ty].inner {
                    uniforms = Some(UniformBlock {
                        members: members
                            .iter()
                            .filter_map(|m| Some((m.name.clone()?, m.offset)))
                            .collect(),
                        size: *span,
                    });
                }
            }
            AddressSpace::Handle if binding.group == TEXTURE_GROUP => {
                if matches!(module.types[global.ty].inner, TypeInner::Image { .. }) {
                    textures.insert(name.clone(), binding.binding);
                }
            }
            _ => {}
        }
    }

    Ok(StageInterface {
        stage,
        entry_point: entry.name.clone(),
        inputs,
        outputs,
        uniforms,
        textures,
    })
}

fn collect_struct_locations(
    module: &Module,
    ty: naga::Handle<naga::Type>,
    mut visit: impl FnMut(&str, u32),
) {
    let TypeInner::Struct { members, .. } = &module.types[ty].inner else {
        return;
    };
    for member in members {
        if let Some(Binding::Location { location, .. }) = &member.binding {
            visit(member.name.as_deref().unwrap_or(""), *location);
        }
    }
}

/// Checks that `vertex` feeds `fragment` and merges their interfaces.
pub(crate) fn link_stages(
    vertex: &StageInterface,
    fragment: &StageInterface,
) -> Result<ProgramInterface, String> {
    if vertex.stage != ShaderStage::Vertex || fragment.stage != ShaderStage::Fragment {
        return Err(format!(
            "expected a vertex and a fragment stage, got {} and {}",
            vertex.stage, fragment.stage
        ));
    }

    let mut missing: Vec<(&str, u32)> = fragment
        .inputs
        .iter()
        .filter(|(_, loc)| !vertex.outputs.contains(loc))
        .map(|(name, loc)| (name.as_str(), *loc))
        .collect();
    if !missing.is_empty() {
        missing.sort_unstable_by_key(|(_, loc)| *loc);
        let names: Vec<String> = missing
            .iter()
            .map(|(name, loc)| format!("{name} (location {loc})"))
            .collect();
        return Err(format!(
            "fragment inputs not written by the vertex stage: {}",
            names.join(", ")
        ));
    }

    let uniforms = match (&vertex.uniforms, &fragment.uniforms) {
        (Some(v), Some(f)) => {
            for (name, offset) in &f.members {
                if v.members.get(name).is_some_and(|o| o != offset) {
                    return Err(format!("uniform {name} has different offsets per stage"));
                }
            }
            let mut merged = v.clone();
            merged.members.extend(f.members.clone());
            merged.size = v.size.max(f.size);
            merged
        }
        (Some(b), None) | (None, Some(b)) => b.clone(),
        (None, None) => UniformBlock::default(),
    };
    if uniforms.size > UNIFORM_SLOT_SIZE {
        return Err(format!(
            "uniform block is {} bytes, at most {UNIFORM_SLOT_SIZE} are supported",
            uniforms.size
        ));
    }

    let mut textures = vertex.textures.clone();
    textures.extend(fragment.textures.clone());

    Ok(ProgramInterface {
        attributes: vertex.inputs.clone(),
        uniforms,
        textures,
    })
}
