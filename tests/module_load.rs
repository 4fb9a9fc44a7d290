mod support;

use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

use enginevisor::{
    BundleSource, EngineError, HostContext, ModuleListener, ModuleLoadRequest, ModuleLoadStatus,
    RootId,
};
use support::{Call, ModuleLog, Recorder, Refuse, config, engine, next_bundle, ready, settle};

fn request(source: &str) -> ModuleLoadRequest {
    ModuleLoadRequest::new("App")
        .with_host(HostContext::new(()))
        .with_source(BundleSource::Asset(source.into()))
}

fn bridge_touched(c: &Call) -> bool {
    matches!(c, Call::RunBundle { .. } | Call::LoadInstance { .. })
}

#[tokio::test(flavor = "multi_thread")]
async fn test_load_before_ready_reports_uninitialized() {
    let rec = Recorder::new();
    let engine = engine(config(false), &rec);
    let listener = ModuleLog::new();

    engine.load_module(request("app.bundle"), Some(listener.clone())).unwrap();
    settle(&engine).await;

    assert_eq!(listener.seen(), vec![ModuleLoadStatus::EngineUninitialized]);
    assert_eq!(rec.count(bridge_touched), 0);
    assert!(engine.roots().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_invalid_requests_are_rejected_without_binding() {
    let rec = Recorder::new();
    let engine = engine(config(false), &rec);
    ready(&engine, &rec).await;
    let listener = ModuleLog::new();

    engine.load_module(request("  "), Some(listener.clone())).unwrap();
    engine
        .load_module(ModuleLoadRequest::new("App").with_host(HostContext::new(())), Some(listener.clone()))
        .unwrap();
    engine
        .load_module(
            ModuleLoadRequest::new("App").with_source(BundleSource::Asset("app.bundle".into())),
            Some(listener.clone()),
        )
        .unwrap();
    settle(&engine).await;

    assert_eq!(listener.seen(), vec![ModuleLoadStatus::InvalidArgument; 3]);
    assert!(engine.roots().is_empty());
    assert_eq!(rec.count(|c| matches!(c, Call::CreateRoot { .. })), 0);
    assert_eq!(rec.count(bridge_touched), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_surface_reports_variable_null() {
    let rec = Recorder::new();
    let engine = engine(config(false), &rec);
    ready(&engine, &rec).await;
    let listener = ModuleLog::new();

    let req = ModuleLoadRequest::new("App")
        .with_host(HostContext::new(Refuse))
        .with_source(BundleSource::Asset("app.bundle".into()));
    engine.load_module(req, Some(listener.clone())).unwrap();
    settle(&engine).await;

    assert_eq!(listener.seen(), vec![ModuleLoadStatus::VariableNull]);
    assert!(engine.roots().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_root_creation_failure_reports_failed() {
    let rec = Recorder::new();
    rec.fail_create_root.store(true, Ordering::SeqCst);
    let engine = engine(config(false), &rec);
    ready(&engine, &rec).await;
    let listener = ModuleLog::new();

    engine.load_module(request("app.bundle"), Some(listener.clone())).unwrap();
    settle(&engine).await;

    assert_eq!(listener.seen(), vec![ModuleLoadStatus::Failed]);
    assert!(engine.roots().is_empty());
    assert_eq!(rec.count(bridge_touched), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_debug_mode_skips_bundle_execution() {
    let rec = Recorder::new();
    let engine = engine(config(true), &rec);
    ready(&engine, &rec).await;
    let listener = ModuleLog::new();

    // Debug mode serves code from the dev server, so no source is required.
    let req = ModuleLoadRequest::new("App").with_host(HostContext::new(()));
    engine.load_module(req, Some(listener.clone())).unwrap();
    settle(&engine).await;

    assert_eq!(listener.seen(), vec![ModuleLoadStatus::Ok]);
    assert_eq!(rec.count(|c| matches!(c, Call::RunBundle { .. })), 0);
    assert!(rec.calls().contains(&Call::LoadInstance {
        attempt: 1,
        component: "App".into(),
        root: RootId(1)
    }));
    assert_eq!(engine.roots(), vec![RootId(1)]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_release_mode_reports_after_bundle_completes() {
    let rec = Recorder::new();
    let engine = engine(config(false), &rec);
    ready(&engine, &rec).await;
    let listener = ModuleLog::new();

    engine.load_module(request("app.bundle"), Some(listener.clone())).unwrap();
    let (attempt, root, cb) = next_bundle(&engine, &rec).await;
    assert_eq!((attempt, root), (1, RootId(1)));
    assert!(listener.seen().is_empty());
    assert_eq!(engine.roots(), vec![RootId(1)]);

    let order: Vec<Call> = rec.calls().into_iter().filter(bridge_touched).collect();
    assert_eq!(
        order,
        vec![
            Call::RunBundle {
                attempt: 1,
                root: RootId(1),
                path: "app.bundle".into()
            },
            Call::LoadInstance {
                attempt: 1,
                component: "App".into(),
                root: RootId(1)
            },
        ]
    );

    cb(Ok(()));
    settle(&engine).await;
    assert_eq!(listener.seen(), vec![ModuleLoadStatus::Ok]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_bundle_failure_reports_failed() {
    let rec = Recorder::new();
    let engine = engine(config(false), &rec);
    ready(&engine, &rec).await;
    let listener = ModuleLog::new();

    engine.load_module(request("app.bundle"), Some(listener.clone())).unwrap();
    let (_, _, cb) = next_bundle(&engine, &rec).await;
    cb(Err(EngineError::bridge("syntax error")));
    settle(&engine).await;

    assert_eq!(listener.seen(), vec![ModuleLoadStatus::Failed]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_bound_modules_run_again_after_restart() {
    let rec = Recorder::new();
    rec.auto_destroy.store(true, Ordering::SeqCst);
    let engine = engine(config(false), &rec);
    ready(&engine, &rec).await;
    let listener = ModuleLog::new();

    engine.load_module(request("app.bundle"), Some(listener.clone())).unwrap();
    let (_, _, cb) = next_bundle(&engine, &rec).await;
    cb(Ok(()));

    engine.restart(false).unwrap();
    let (attempt, init) = support::next_init(&engine, &rec).await;
    assert_eq!(attempt, 2);
    init(Ok(()));

    let (attempt, root, cb) = next_bundle(&engine, &rec).await;
    assert_eq!((attempt, root), (2, RootId(1)));
    cb(Ok(()));
    settle(&engine).await;

    assert_eq!(listener.seen(), vec![ModuleLoadStatus::Ok, ModuleLoadStatus::Ok]);
    // The render tree was rebuilt, so the root was created on the new tree too.
    assert!(rec.calls().contains(&Call::CreateRoot {
        tree: 2,
        root: RootId(1)
    }));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stale_bundle_completion_is_dropped() {
    let rec = Recorder::new();
    rec.auto_destroy.store(true, Ordering::SeqCst);
    let engine = engine(config(false), &rec);
    ready(&engine, &rec).await;
    let listener = ModuleLog::new();

    engine.load_module(request("app.bundle"), Some(listener.clone())).unwrap();
    let (_, _, old_cb) = next_bundle(&engine, &rec).await;
    engine.restart(false).unwrap();
    let (_, init) = support::next_init(&engine, &rec).await;

    old_cb(Ok(()));
    settle(&engine).await;
    assert!(listener.seen().is_empty());
    drop(init);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_preload_bundle_runs_on_preload_root() {
    let rec = Recorder::new();
    let mut cfg = config(false);
    cfg.preload_bundle = Some(BundleSource::Asset("vendor.bundle".into()));
    let engine = engine(cfg, &rec);
    ready(&engine, &rec).await;

    assert!(rec.calls().contains(&Call::RunBundle {
        attempt: 1,
        root: RootId::PRELOAD,
        path: "vendor.bundle".into()
    }));
    assert_eq!(rec.pending_bundles(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_destroy_module_confirms_after_instance_destroyed() {
    let rec = Recorder::new();
    let engine = engine(config(true), &rec);
    ready(&engine, &rec).await;
    engine
        .load_module(ModuleLoadRequest::new("App").with_host(HostContext::new(())), None)
        .unwrap();
    settle(&engine).await;
    let root = engine.roots()[0];

    let answers = Arc::new(Mutex::new(Vec::new()));
    let sink = answers.clone();
    engine
        .destroy_module(root, move |ok| sink.lock().unwrap().push(ok))
        .unwrap();
    settle(&engine).await;
    assert!(rec.calls().contains(&Call::DestroyInstance { attempt: 1, root }));
    assert!(answers.lock().unwrap().is_empty());
    assert_eq!(engine.roots(), vec![root]);

    engine.on_instance_destroy(root).unwrap();
    settle(&engine).await;
    assert_eq!(*answers.lock().unwrap(), vec![true]);
    assert!(engine.roots().is_empty());
    assert!(rec.calls().contains(&Call::DestroyRoot { tree: 1, root }));

    let sink = answers.clone();
    engine
        .destroy_module(RootId(42), move |ok| sink.lock().unwrap().push(ok))
        .unwrap();
    settle(&engine).await;
    assert_eq!(*answers.lock().unwrap(), vec![true, false]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_first_view_goes_to_latest_module_listener() {
    let rec = Recorder::new();
    let engine = engine(config(true), &rec);
    ready(&engine, &rec).await;
    let first = ModuleLog::new();
    let second = ModuleLog::new();

    let req = || ModuleLoadRequest::new("App").with_host(HostContext::new(()));
    engine.load_module(req(), Some(first.clone())).unwrap();
    engine.load_module(req(), Some(second.clone())).unwrap();
    engine.on_first_view_added().unwrap();
    settle(&engine).await;

    assert_eq!(first.first_views(), 0);
    assert_eq!(second.first_views(), 1);
    assert_eq!(engine.roots(), vec![RootId(1), RootId(2)]);
}

struct Silent;

impl ModuleListener for Silent {
    fn on_load_completed(&self, _: ModuleLoadStatus, _: Option<&str>) {}
}

#[tokio::test(flavor = "multi_thread")]
async fn test_loads_after_destroy_report_uninitialized() {
    let rec = Recorder::new();
    rec.auto_destroy.store(true, Ordering::SeqCst);
    let engine = engine(config(true), &rec);
    ready(&engine, &rec).await;
    engine.destroy().unwrap();
    engine.wait_for(|s| s.is_terminal()).await.unwrap();

    let listener = ModuleLog::new();
    engine
        .load_module(ModuleLoadRequest::new("App").with_host(HostContext::new(())), Some(listener.clone()))
        .unwrap();
    engine
        .load_module(ModuleLoadRequest::new("Other").with_host(HostContext::new(())), Some(Arc::new(Silent)))
        .unwrap();
    settle(&engine).await;

    assert_eq!(listener.seen(), vec![ModuleLoadStatus::EngineUninitialized]);
    assert_eq!(rec.count(bridge_touched), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_reload_keeps_roots_confirmed_by_host() {
    let rec = Recorder::new();
    let engine = engine(config(true), &rec);
    ready(&engine, &rec).await;
    let listener = ModuleLog::new();

    let req = ModuleLoadRequest::new("App")
        .with_host(HostContext::new(()))
        .with_source(BundleSource::Asset("app.bundle".into()));
    engine.load_module(req, Some(listener.clone())).unwrap();
    settle(&engine).await;
    let root = engine.roots()[0];

    engine.reload().unwrap();
    settle(&engine).await;
    assert!(rec.calls().contains(&Call::DestroyInstance { attempt: 1, root }));

    // The host confirms the instance teardown the reload asked for.
    engine.on_instance_destroy(root).unwrap();
    settle(&engine).await;
    assert_eq!(engine.roots(), vec![root]);

    let (_, is_reload, destroyed) = rec.take_destroy().expect("reload destroy requested");
    assert!(is_reload);
    destroyed();
    let (attempt, init) = support::next_init(&engine, &rec).await;
    assert_eq!(attempt, 2);
    init(Ok(()));
    engine.wait_for(|s| s == enginevisor::EngineState::Ready).await.unwrap();
    settle(&engine).await;

    assert_eq!(engine.roots(), vec![root]);
    assert_eq!(rec.count(|c| matches!(c, Call::DestroyRoot { .. })), 0);
    assert!(rec.calls().contains(&Call::LoadInstance {
        attempt: 2,
        component: "App".into(),
        root
    }));
    assert_eq!(listener.seen(), vec![ModuleLoadStatus::Ok, ModuleLoadStatus::Ok]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_destroy_module_during_reload_still_unbinds() {
    let rec = Recorder::new();
    let engine = engine(config(true), &rec);
    ready(&engine, &rec).await;
    engine
        .load_module(ModuleLoadRequest::new("App").with_host(HostContext::new(())), None)
        .unwrap();
    settle(&engine).await;
    let root = engine.roots()[0];

    engine.reload().unwrap();
    let answers = Arc::new(Mutex::new(Vec::new()));
    let sink = answers.clone();
    engine
        .destroy_module(root, move |ok| sink.lock().unwrap().push(ok))
        .unwrap();
    engine.on_instance_destroy(root).unwrap();
    settle(&engine).await;

    assert_eq!(*answers.lock().unwrap(), vec![true]);
    assert!(engine.roots().is_empty());
}
