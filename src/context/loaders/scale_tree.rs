//! Loads the tested scale and its subscales.
use std::sync::Arc;

use crate::context::{
    errors::ContextResult,
    loader::ContextLoader,
    repository::CatalogRepository,
    value::{Context, ContextValue, keys},
};

pub struct ScaleTreeLoader {
    catalog: Arc<dyn CatalogRepository>,
}

impl ScaleTreeLoader {
    pub fn new(catalog: Arc<dyn CatalogRepository>) -> Self {
        Self { catalog }
    }
}

impl ContextLoader for ScaleTreeLoader {
    fn name(&self) -> &'static str {
        "scale_tree"
    }

    fn provides(&self) -> &'static [&'static str] {
        &[keys::SCALES]
    }

    fn requires(&self) -> &'static [&'static str] {
        &[keys::SCALE_ID]
    }

    fn load(&self, context: &Context) -> ContextResult<Context> {
        let tree = self.catalog.scale_tree(context.id(keys::SCALE_ID)?)?;
        Ok(Context::new().with(keys::SCALES, ContextValue::Scales(tree)))
    }
}
