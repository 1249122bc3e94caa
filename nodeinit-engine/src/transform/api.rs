//! HTTP method surface.

use nodeinit_core::{ApiMethod, TreePath};
use nodeinit_edit::RefScope;

use super::{TransformContext, Transformer};
use crate::edit::FileEdit;
use crate::error::Stage;

#[derive(Debug, Clone, Copy, Default)]
pub struct ApiMethods;

/// Region owning the handler of `method`.
pub fn region(method: ApiMethod) -> String {
    format!("api-{}", method.as_str())
}

impl Transformer for ApiMethods {
    fn stage(&self) -> Stage {
        Stage::ApiMethods
    }

    fn edits(&self, ctx: &TransformContext<'_>) -> Vec<FileEdit> {
        let pruned = ctx.selection.pruned_methods();
        let Some(fallback) = ApiMethod::ALL
            .iter()
            .copied()
            .find(|m| ctx.selection.api_methods.contains(m))
        else {
            return Vec::new();
        };

        let controller = ctx.master_controller();
        let readme = ctx.readme();
        let routes = ctx.source("app/routes/user.routes");
        let mut edits = Vec::new();
        for method in pruned {
            let region = region(method);
            edits.push(FileEdit::strip(&controller, &region));
            edits.push(FileEdit::strip(&readme, &region));
            edits.push(FileEdit::rewrite(
                &routes,
                method.as_str(),
                fallback.as_str(),
                RefScope::MemberCall,
            ));
        }
        edits
    }

    fn touched(&self, ctx: &TransformContext<'_>) -> Vec<TreePath> {
        if ctx.selection.pruned_methods().is_empty() {
            return Vec::new();
        }
        let mut paths = vec![
            ctx.master_controller(),
            ctx.readme(),
            ctx.source("app/routes/user.routes"),
        ];
        paths.sort();
        paths
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use nodeinit_core::{DatabaseKind, FeatureSelection};

    use super::*;
    use crate::transform::testing;

    #[test]
    fn pruned_calls_fall_back_to_first_kept_method() {
        let mut sel = FeatureSelection::custom("demo", DatabaseKind::Mongo);
        sel.api_methods = vec![ApiMethod::Put, ApiMethod::Post];
        let tree = testing::fixture(&sel);
        let versions = BTreeMap::new();
        let edits = ApiMethods.edits(&testing::ctx(&tree, &sel, &versions));
        let routes = TreePath::new("src/app/routes/user.routes.ts");
        assert!(edits.contains(&FileEdit::rewrite(&routes, "get", "post", RefScope::MemberCall)));
        assert!(edits.contains(&FileEdit::rewrite(&routes, "patch", "post", RefScope::MemberCall)));
        assert!(edits.contains(&FileEdit::strip(
            &TreePath::new("src/app/utils/MasterController.ts"),
            "api-delete"
        )));
        assert_eq!(edits.len(), 9);
    }

    #[test]
    fn full_method_set_touches_nothing() {
        let sel = FeatureSelection::custom("demo", DatabaseKind::Mongo);
        let tree = testing::fixture(&sel);
        let versions = BTreeMap::new();
        let ctx = testing::ctx(&tree, &sel, &versions);
        assert!(ApiMethods.edits(&ctx).is_empty());
        assert!(ApiMethods.touched(&ctx).is_empty());
    }
}
