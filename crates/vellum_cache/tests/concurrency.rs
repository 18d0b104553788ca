//! Racing lookups against both caches from many threads.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use vellum_cache::{
    ActivationFactoryCache, ArtifactCache, CacheServices, CapabilityMap, CompilationError,
    CompiledArtifact, Compiler, Component, ComponentType, Constructor, DefaultFactoryBuilder,
    FactoryBuilder, Instance, PageFactory,
};
use vellum_common::ResourceKey;
use vellum_source::{FileInfo, FileProvider, InMemoryFileProvider};

struct Widget;

impl Instance for Widget {}

impl Component for Widget {
    fn constructors() -> Vec<Constructor> {
        vec![Constructor::nullary(|_| Ok(Box::new(Widget)))]
    }
}

fn in_memory(files: &[(&str, &str)]) -> Arc<InMemoryFileProvider> {
    let provider = Arc::new(InMemoryFileProvider::new());
    for (key, content) in files {
        provider.add_file(*key, content);
    }
    provider
}

#[test]
fn racing_misses_leave_one_entry_and_valid_values() {
    let provider = in_memory(&[("Views/_ViewStart.cshtml", "layout")]);
    let cache: ArtifactCache<String> = ArtifactCache::new(provider.clone() as Arc<dyn FileProvider>);
    let key = ResourceKey::new("Views/_ViewStart.cshtml");
    let computed = AtomicUsize::new(0);

    let results: Vec<Option<String>> = (0..64)
        .into_par_iter()
        .map(|_| {
            cache
                .get_or_add(&key, |file| {
                    computed.fetch_add(1, Ordering::SeqCst);
                    file.read_to_string()
                })
                .unwrap()
        })
        .collect();

    assert!(results.iter().all(|r| r.as_deref() == Some("layout")));
    assert_eq!(cache.len(), 1);
    let calls = computed.load(Ordering::SeqCst);
    assert!((1..=64).contains(&calls));
}

#[test]
fn racing_absent_lookups_never_compute() {
    let provider = in_memory(&[]);
    let cache: ArtifactCache<String> = ArtifactCache::new(provider.clone() as Arc<dyn FileProvider>);
    let key = ResourceKey::new("/Views/Missing.cshtml");

    (0..64).into_par_iter().for_each(|_| {
        let value = cache
            .get_or_add(&key, |_| -> Result<String, String> {
                panic!("absent resources are never compiled")
            })
            .unwrap();
        assert!(value.is_none());
    });
    assert_eq!(cache.len(), 1);
}

#[test]
fn expiry_during_reads_is_observed() {
    let provider = in_memory(&[("/Index.cshtml", "v1")]);
    let cache: ArtifactCache<String> = ArtifactCache::new(provider.clone() as Arc<dyn FileProvider>);
    let key = ResourceKey::new("/Index.cshtml");
    let read = |file: &FileInfo| file.read_to_string();

    assert_eq!(cache.get_or_add(&key, read).unwrap().as_deref(), Some("v1"));
    provider.add_file("/Index.cshtml", "v2");
    provider.expire("/Index.cshtml");

    let results: Vec<String> = (0..32)
        .into_par_iter()
        .map(|_| cache.get_or_add(&key, read).unwrap().unwrap())
        .collect();
    assert!(results.iter().all(|r| r == "v2"));
    assert_eq!(cache.get_or_add(&key, read).unwrap().as_deref(), Some("v2"));
}

#[test]
fn racing_factory_builds_retain_one_factory() {
    let cache = ActivationFactoryCache::new();
    let builds = AtomicUsize::new(0);
    let builder = |component: &ComponentType| {
        builds.fetch_add(1, Ordering::SeqCst);
        DefaultFactoryBuilder.build(component)
    };
    let component = ComponentType::of::<Widget>();

    let factories: Vec<_> = (0..64)
        .into_par_iter()
        .map(|_| cache.get_or_add(&component, &builder).unwrap())
        .collect();

    let first = &factories[0];
    assert!(factories.iter().all(|f| Arc::ptr_eq(f, first)));
    assert_eq!(cache.len(), 1);
    assert!(builds.load(Ordering::SeqCst) >= 1);
}

#[test]
fn concurrent_page_requests() {
    let provider = in_memory(&[("/Views/A.cshtml", "a"), ("/Views/B.cshtml", "b")]);
    let services = Arc::new(CacheServices::new(provider));
    let compiler = |file: &FileInfo| -> Result<CompiledArtifact, CompilationError> {
        let hash = file
            .content_hash()
            .map_err(|e| CompilationError::new(file.key().as_str(), e.to_string()))?;
        Ok(CompiledArtifact::new(
            ComponentType::of::<Widget>(),
            file.key().clone(),
            hash,
        ))
    };
    let mut caps = CapabilityMap::new();
    caps.insert::<dyn Compiler>(Arc::new(compiler));
    let pages = PageFactory::new(Arc::clone(&services), Arc::new(caps));

    let found: usize = (0..200)
        .into_par_iter()
        .map(|i| {
            let path = match i % 3 {
                0 => "~/Views/A.cshtml",
                1 => "~/Views/B.cshtml",
                _ => "~/Views/C.cshtml",
            };
            match pages.create_instance(path).unwrap() {
                Some(instance) => {
                    assert!(instance.is::<Widget>());
                    pages.release(instance);
                    1
                }
                None => 0,
            }
        })
        .sum();

    assert_eq!(found, 134);
    assert_eq!(services.artifacts().len(), 3);
    assert_eq!(services.factories().len(), 1);
}
