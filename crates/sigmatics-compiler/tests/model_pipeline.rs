//! Descriptor → compiled model → run, through the cache

use sigmatics_compiler::{
    compile_model, compile_model_with, model_key, validate_descriptor, Backend, BackendPreference, CacheStats,
    CompileError, CompileOptions, Complexity, ModelCache, ModelDescriptor, Outcome, RingResult, RuntimeParams,
};

fn descriptor(name: &str) -> ModelDescriptor {
    ModelDescriptor::new(name, "1.0.0", "sigmatics.pipeline")
}

#[test]
fn test_every_recipe_compiles() {
    let cases = [
        descriptor("literal").with_param("class", 3),
        descriptor("lift").with_param("class", 3),
        descriptor("project").with_param("class", 3),
        descriptor("project_grade").with_param("class", 3).with_param("grade", 1),
        descriptor("add96").with_param("class", 3).with_runtime_param("b"),
        descriptor("sub96").with_param("class", 3).with_runtime_param("b"),
        descriptor("mul96").with_param("class", 3).with_runtime_param("b"),
        descriptor("rotate").with_param("class", 3),
        descriptor("triality").with_param("class", 3),
        descriptor("twist").with_param("class", 3),
        descriptor("mirror").with_param("class", 3),
    ];
    for desc in cases {
        let model = compile_model(&desc).unwrap_or_else(|err| panic!("{}: {err}", desc.name));
        assert!(validate_descriptor(&desc).valid);
        let params = RuntimeParams::new().with("b", 2);
        assert!(model.run(&params).unwrap().value().is_some(), "{}", desc.name);
    }
}

#[test]
fn test_recipe_results() {
    let run = |desc: ModelDescriptor| compile_model(&desc).unwrap().run(&RuntimeParams::new().with("b", 2)).unwrap();

    assert_eq!(run(descriptor("project").with_param("class", 44)), Outcome::Number(44));
    assert_eq!(run(descriptor("triality").with_param("class", 0).with_param("k", 2)), Outcome::Number(16));
    assert_eq!(
        run(descriptor("mul96")
            .with_param("class", 50)
            .with_param("overflow", "track")
            .with_runtime_param("b")),
        Outcome::Tracked(RingResult { value: 4, overflow: true })
    );
}

#[test]
fn test_json_descriptor_pipeline() {
    let json = r#"{
        "name": "sub96",
        "version": "2.1.0",
        "namespace": "sigmatics.pipeline",
        "compiledParams": { "overflow": "track" },
        "runtimeParams": ["a", "b"]
    }"#;
    let desc = ModelDescriptor::from_json(json).unwrap();
    let model = compile_model(&desc).unwrap();
    assert_eq!(model.complexity(), Complexity::C1);
    assert_eq!(model.backend(), Backend::Class);
    let outcome = model.run(&RuntimeParams::new().with("a", 10).with("b", 15)).unwrap();
    assert_eq!(outcome.value(), Some(91));
    assert_eq!(outcome.overflow(), Some(true));
}

#[test]
fn test_backends_agree_through_models() {
    let desc = descriptor("add96")
        .with_param("overflow", "track")
        .with_runtime_param("a")
        .with_runtime_param("b");
    let class = compile_model_with(&desc, &CompileOptions::default().with_backend(BackendPreference::Class)).unwrap();
    let sga = compile_model_with(&desc, &CompileOptions::default().with_backend(BackendPreference::Sga)).unwrap();
    assert_eq!(class.backend(), Backend::Class);
    assert_eq!(sga.backend(), Backend::Sga);
    for (a, b) in [(0, 0), (95, 1), (-3, 7), (1000, -1000)] {
        let params = RuntimeParams::new().with("a", a).with("b", b);
        assert_eq!(class.run(&params).unwrap(), sga.run(&params).unwrap());
    }
}

#[test]
fn test_unknown_model_message() {
    let err = compile_model(&descriptor("warp")).unwrap_err();
    assert!(matches!(err, CompileError::UnknownModel(ref name) if name == "warp"));
    assert_eq!(err.to_string(), "UnknownModel: warp");
}

#[test]
fn test_cache_shares_equivalent_descriptors() {
    let cache = ModelCache::new();
    let a = descriptor("rotate").with_param("class", 3).with_param("k", 1);
    let b = descriptor("rotate").with_param("k", 1).with_param("class", 3);
    assert_eq!(model_key(&a, Some("schema")), model_key(&b, Some("schema")));

    cache.get_or_compile(&a, Some("schema")).unwrap();
    cache.get_or_compile(&b, Some("schema")).unwrap();
    cache.get_or_compile(&a, None).unwrap();
    assert_eq!(
        cache.stats(),
        CacheStats {
            hits: 1,
            misses: 2,
            entries: 2
        }
    );
}

#[test]
fn test_version_bump_changes_key() {
    let v1 = descriptor("literal").with_param("class", 1);
    let mut v2 = v1.clone();
    v2.version = "1.0.1".to_string();
    assert_ne!(model_key(&v1, None), model_key(&v2, None));
}
