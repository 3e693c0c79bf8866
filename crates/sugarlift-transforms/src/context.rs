//! Run-scoped context passed to transforms.

use crate::config::TransformSettings;
use crate::type_builder::TypeSyntaxBuilder;

/// Everything a transform may consult during one run.
///
/// The context is borrowed for the duration of a run and threaded through the
/// traversal; transforms keep no reference to it afterwards.
#[derive(Clone, Copy)]
pub struct TransformContext<'a> {
    pub settings: &'a TransformSettings,
    pub type_builder: &'a dyn TypeSyntaxBuilder,
}

impl<'a> TransformContext<'a> {
    pub fn new(settings: &'a TransformSettings, type_builder: &'a dyn TypeSyntaxBuilder) -> Self {
        Self {
            settings,
            type_builder,
        }
    }
}

impl std::fmt::Debug for TransformContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformContext")
            .field("settings", self.settings)
            .finish_non_exhaustive()
    }
}
