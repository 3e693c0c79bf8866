#![no_main]

use libfuzzer_sys::fuzz_target;
use sugarlift_core::Stmt;
use sugarlift_transforms::{
    AstTransform, DefaultTypeBuilder, ReplaceMethodCallsWithOperators, TransformContext,
    TransformSettings,
};

fuzz_target!(|data: &[u8]| {
    let Ok(mut root) = serde_json::from_slice::<Stmt>(data) else {
        return;
    };

    let settings = TransformSettings::default();
    let builder = DefaultTypeBuilder::default();
    let ctx = TransformContext::new(&settings, &builder);
    let pass = ReplaceMethodCallsWithOperators::new();

    pass.run(&mut root, &ctx);
    let _ = root.to_string();
});
