use crate::{errors::CompileErrorKind, registry::ContainerBuilder};

/// Step run over the registered definitions after their types are resolved and before they are completed
pub trait CompilerPass<M: ?Sized> {
    #[inline]
    fn name(&self) -> &'static str {
        "anonymous"
    }

    /// # Errors
    /// Any error aborts the compile
    fn before_compile(&mut self, builder: &mut ContainerBuilder, metadata: &M) -> Result<(), CompileErrorKind>;
}

/// Pass backed by a closure, see [`pass_fn`]
#[derive(Clone)]
pub struct FnPass<F>(pub(crate) F);

impl<F, M> CompilerPass<M> for FnPass<F>
where
    F: FnMut(&mut ContainerBuilder, &M) -> anyhow::Result<()>,
    M: ?Sized,
{
    #[inline]
    fn before_compile(&mut self, builder: &mut ContainerBuilder, metadata: &M) -> Result<(), CompileErrorKind> {
        self.0(builder, metadata).map_err(CompileErrorKind::Custom)
    }
}

/// Wraps a closure into a [`CompilerPass`]. Its errors surface as [`CompileErrorKind::Custom`].
#[inline]
#[must_use]
pub fn pass_fn<F, M>(f: F) -> FnPass<F>
where
    F: FnMut(&mut ContainerBuilder, &M) -> anyhow::Result<()>,
    M: ?Sized,
{
    FnPass(f)
}
