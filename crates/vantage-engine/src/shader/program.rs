use std::collections::HashMap;

use thiserror::Error;

use crate::device::{BindingKind, Location, ProgramHandle, ShaderCompiler, ShaderStage};

/// Fatal shader pipeline failure. No fallback program is ever substituted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShaderError {
    #[error("{stage} shader failed to compile:\n{log}")]
    Compile { stage: ShaderStage, log: String },

    #[error("program failed to link:\n{log}")]
    Link { log: String },
}

/// Vertex + fragment source pair.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ShaderSources {
    pub vertex: &'static str,
    pub fragment: &'static str,
}

/// A linked program with a location cache.
///
/// Lookups are idempotent: the first query for a `(name, kind)` pair asks the
/// compiler, later queries return the cached answer, including "not found".
#[derive(Debug)]
pub struct ShaderProgram {
    handle: ProgramHandle,
    locations: HashMap<(String, BindingKind), Option<Location>>,
}

impl ShaderProgram {
    /// Compiles both stages and links them.
    pub fn build<C>(
        compiler: &mut C,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self, ShaderError>
    where
        C: ShaderCompiler + ?Sized,
    {
        let vertex = compiler.compile(ShaderStage::Vertex, vertex_source)?;
        let fragment = compiler.compile(ShaderStage::Fragment, fragment_source)?;
        let handle = compiler.link(vertex, fragment)?;

        log::debug!("shader program #{} linked", handle.raw());

        Ok(Self {
            handle,
            locations: HashMap::new(),
        })
    }

    pub fn from_sources<C>(compiler: &mut C, sources: ShaderSources) -> Result<Self, ShaderError>
    where
        C: ShaderCompiler + ?Sized,
    {
        Self::build(compiler, sources.vertex, sources.fragment)
    }

    #[inline]
    pub fn handle(&self) -> ProgramHandle {
        self.handle
    }

    /// Resolves a binding slot. `None` means the program does not declare it,
    /// which is legitimate for optional uniforms.
    pub fn locate<C>(&mut self, compiler: &C, name: &str, kind: BindingKind) -> Option<Location>
    where
        C: ShaderCompiler + ?Sized,
    {
        let handle = self.handle;
        *self
            .locations
            .entry((name.to_owned(), kind))
            .or_insert_with(|| compiler.location(handle, name, kind))
    }

    /// Number of distinct `(name, kind)` pairs resolved so far.
    pub fn cached_locations(&self) -> usize {
        self.locations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::recording::RecordingDevice;

    #[test]
    fn build_compiles_both_stages_then_links() {
        let mut dev = RecordingDevice::new();
        let program = ShaderProgram::build(&mut dev, "vs", "fs").expect("program");
        assert_eq!(dev.compiled_stages(), vec![ShaderStage::Vertex, ShaderStage::Fragment]);
        assert_eq!(dev.linked_programs(), 1);
        assert_eq!(program.cached_locations(), 0);
    }

    #[test]
    fn compile_failure_reports_stage_and_log() {
        let mut dev = RecordingDevice::new();
        dev.fail_compile(ShaderStage::Fragment, "unexpected token");

        let err = ShaderProgram::build(&mut dev, "vs", "fs").unwrap_err();
        assert_eq!(
            err,
            ShaderError::Compile {
                stage: ShaderStage::Fragment,
                log: "unexpected token".into(),
            }
        );
        assert_eq!(dev.linked_programs(), 0);
    }

    #[test]
    fn link_failure_is_reported() {
        let mut dev = RecordingDevice::new();
        dev.fail_link("varying mismatch");
        let err = ShaderProgram::build(&mut dev, "vs", "fs").unwrap_err();
        assert!(matches!(err, ShaderError::Link { ref log } if log == "varying mismatch"));
    }

    #[test]
    fn locate_is_idempotent_and_cached() {
        let mut dev = RecordingDevice::new();
        let mut program = ShaderProgram::build(&mut dev, "vs", "fs").unwrap();

        let first = program.locate(&dev, "u_Matrix", BindingKind::Uniform);
        let second = program.locate(&dev, "u_Matrix", BindingKind::Uniform);

        assert!(first.is_some());
        assert_eq!(first, second);
        assert_eq!(dev.location_queries(), 1);
    }

    #[test]
    fn locate_missing_returns_none_every_time() {
        let mut dev = RecordingDevice::new();
        let mut program = ShaderProgram::build(&mut dev, "vs", "fs").unwrap();

        assert_eq!(program.locate(&dev, "u_Missing", BindingKind::Uniform), None);
        assert_eq!(program.locate(&dev, "u_Missing", BindingKind::Uniform), None);
        assert_eq!(dev.location_queries(), 1);
    }

    #[test]
    fn attribute_and_uniform_namespaces_are_distinct() {
        let mut dev = RecordingDevice::new();
        let mut program = ShaderProgram::build(&mut dev, "vs", "fs").unwrap();

        assert!(program.locate(&dev, "a_Position", BindingKind::Attribute).is_some());
        assert_eq!(program.locate(&dev, "a_Position", BindingKind::Uniform), None);
        assert_eq!(program.cached_locations(), 2);
    }
}
