use async_trait::async_trait;
use compose_teardown::adapters::memory::{InMemoryRuntime, RuntimeCall};
use compose_teardown::domain::ports::ResourceExecutor;
use compose_teardown::{
    cancel_scope, CancelHandle, CancelSignal, Container, ContainerMetadata, Network, Project, ResourceKind, ResourceOutcome,
    TeardownEngine, TeardownError, TeardownOptions, TeardownReport, Volume,
};

fn remove_container(id: &str, remove_anonymous_volumes: bool) -> RuntimeCall {
    RuntimeCall::RemoveContainer {
        id: id.to_string(),
        remove_anonymous_volumes,
    }
}

fn with_volumes(remove_volumes: bool) -> TeardownOptions {
    TeardownOptions { remove_volumes }
}

/// Cancels the scope as soon as the first container is gone.
struct CancelAfterFirstContainer<'a> {
    runtime: &'a InMemoryRuntime,
    handle: CancelHandle,
}

#[async_trait]
impl ResourceExecutor for CancelAfterFirstContainer<'_> {
    async fn network_exists(
        &self,
        full_name: &str,
        cancel: &CancelSignal,
    ) -> compose_teardown::Result<bool> {
        self.runtime.network_exists(full_name, cancel).await
    }

    async fn volume_exists(
        &self,
        full_name: &str,
        cancel: &CancelSignal,
    ) -> compose_teardown::Result<bool> {
        self.runtime.volume_exists(full_name, cancel).await
    }

    async fn remove_container(
        &self,
        id: &str,
        remove_anonymous_volumes: bool,
        cancel: &CancelSignal,
    ) -> compose_teardown::Result<()> {
        let result = self
            .runtime
            .remove_container(id, remove_anonymous_volumes, cancel)
            .await;
        self.handle.cancel();
        result
    }

    async fn remove_network(
        &self,
        full_name: &str,
        cancel: &CancelSignal,
    ) -> compose_teardown::Result<()> {
        self.runtime.remove_network(full_name, cancel).await
    }

    async fn remove_volume(
        &self,
        full_name: &str,
        force: bool,
        cancel: &CancelSignal,
    ) -> compose_teardown::Result<()> {
        self.runtime.remove_volume(full_name, force, cancel).await
    }
}

fn chain_project() -> Project {
    // b depends on a, c depends on b
    Project::new("chain")
        .with_service("a")
        .with_service("b")
        .with_service("c")
}

#[tokio::test]
async fn test_web_db_scenario_call_sequence() {
    let runtime = InMemoryRuntime::new();
    runtime
        .add_container("web", Container::new("web-1"))
        .add_container("web", Container::new("web-2"))
        .add_container("db", Container::new("db-1"))
        .add_network("proj_default")
        .add_volume("proj_data");

    let project = Project::new("proj")
        .with_service("db")
        .with_service("web")
        .with_network("default", Network::owned("proj_default"))
        .with_volume("data", Volume::owned("proj_data"));

    let engine = TeardownEngine::new(&runtime, &runtime);
    let report = engine
        .tear_down(&project, &with_volumes(true), &CancelSignal::never())
        .await
        .unwrap();

    assert_eq!(
        runtime.removal_calls(),
        vec![
            remove_container("web-1", true),
            remove_container("web-2", true),
            remove_container("db-1", true),
            RuntimeCall::RemoveNetwork("proj_default".to_string()),
            RuntimeCall::RemoveVolume {
                name: "proj_data".to_string(),
                force: true,
            },
        ]
    );
    assert!(report.is_clean());
    assert!(report.finished_at.is_some());
    assert_eq!(report.removed().count(), 5);
    assert_eq!(runtime.container_count(), 0);
    assert!(!runtime.has_network("proj_default"));
    assert!(!runtime.has_volume("proj_data"));
}

#[tokio::test]
async fn test_services_are_removed_in_reverse_order() {
    let runtime = InMemoryRuntime::new();
    runtime
        .add_container("a", Container::new("a-1"))
        .add_container("b", Container::new("b-1"))
        .add_container("c", Container::new("c-1"));

    let engine = TeardownEngine::new(&runtime, &runtime);
    engine
        .tear_down(&chain_project(), &with_volumes(false), &CancelSignal::never())
        .await
        .unwrap();

    let lookups: Vec<RuntimeCall> = runtime
        .calls()
        .into_iter()
        .filter(|call| matches!(call, RuntimeCall::ListContainers(_)))
        .collect();
    assert_eq!(
        lookups,
        vec![
            RuntimeCall::ListContainers("c".to_string()),
            RuntimeCall::ListContainers("b".to_string()),
            RuntimeCall::ListContainers("a".to_string()),
        ]
    );
    assert_eq!(
        runtime.removal_calls(),
        vec![
            remove_container("c-1", false),
            remove_container("b-1", false),
            remove_container("a-1", false),
        ]
    );
}

#[tokio::test]
async fn test_external_resources_are_never_touched() {
    let runtime = InMemoryRuntime::new();
    runtime.add_network("corp_shared").add_volume("corp_archive");

    let project = Project::new("proj")
        .with_service("web")
        .with_network("shared", Network::external("corp_shared"))
        .with_volume("archive", Volume::external("corp_archive"));

    let engine = TeardownEngine::new(&runtime, &runtime);
    let report = engine
        .tear_down(&project, &with_volumes(true), &CancelSignal::never())
        .await
        .unwrap();

    assert_eq!(
        runtime.calls(),
        vec![RuntimeCall::ListContainers("web".to_string())]
    );
    assert!(runtime.has_network("corp_shared"));
    assert!(runtime.has_volume("corp_archive"));
    assert!(report
        .records
        .iter()
        .all(|r| r.outcome == ResourceOutcome::SkippedExternal));
    assert_eq!(report.records.len(), 2);
}

#[tokio::test]
async fn test_second_teardown_is_a_no_op() {
    let runtime = InMemoryRuntime::new();
    runtime
        .add_container("web", Container::new("web-1"))
        .add_network("proj_default")
        .add_volume("proj_data");

    let project = Project::new("proj")
        .with_service("web")
        .with_network("default", Network::owned("proj_default"))
        .with_volume("data", Volume::owned("proj_data"));
    let engine = TeardownEngine::new(&runtime, &runtime);

    engine
        .tear_down(&project, &with_volumes(true), &CancelSignal::never())
        .await
        .unwrap();
    runtime.clear_calls();

    let second = engine
        .tear_down(&project, &with_volumes(true), &CancelSignal::never())
        .await
        .unwrap();

    assert!(runtime.removal_calls().is_empty());
    assert_eq!(second.records_of(ResourceKind::Container).count(), 0);
    assert!(second
        .records
        .iter()
        .all(|r| r.outcome == ResourceOutcome::SkippedAbsent));
}

#[tokio::test]
async fn test_volumes_kept_without_remove_volumes() {
    let runtime = InMemoryRuntime::new();
    runtime
        .add_container("db", Container::new("db-1"))
        .add_volume("proj_data");

    let project = Project::new("proj")
        .with_service("db")
        .with_volume("data", Volume::owned("proj_data"));

    let engine = TeardownEngine::new(&runtime, &runtime);
    let report = engine
        .tear_down(&project, &with_volumes(false), &CancelSignal::never())
        .await
        .unwrap();

    assert!(runtime.has_volume("proj_data"));
    assert!(!runtime
        .calls()
        .iter()
        .any(|call| matches!(call, RuntimeCall::RemoveVolume { .. } | RuntimeCall::VolumeExists(_))));
    assert_eq!(runtime.removal_calls(), vec![remove_container("db-1", false)]);
    assert_eq!(report.records_of(ResourceKind::Volume).count(), 0);
}

#[tokio::test]
async fn test_failed_removals_do_not_stop_teardown() {
    let runtime = InMemoryRuntime::new();
    runtime
        .add_container("web", Container::new("web-1"))
        .add_container("web", Container::new("web-2"))
        .add_container("db", Container::new("db-1"))
        .add_network("proj_front")
        .add_network("proj_back")
        .add_volume("proj_data")
        .fail_removal("web-1")
        .fail_removal("proj_back");

    let project = Project::new("proj")
        .with_service("db")
        .with_service("web")
        .with_network("back", Network::owned("proj_back"))
        .with_network("front", Network::owned("proj_front"))
        .with_volume("data", Volume::owned("proj_data"));

    let engine = TeardownEngine::new(&runtime, &runtime);
    let report = engine
        .tear_down(&project, &with_volumes(true), &CancelSignal::never())
        .await
        .unwrap();

    assert_eq!(
        runtime.removal_calls(),
        vec![
            remove_container("web-1", true),
            remove_container("web-2", true),
            remove_container("db-1", true),
            RuntimeCall::RemoveNetwork("proj_back".to_string()),
            RuntimeCall::RemoveNetwork("proj_front".to_string()),
            RuntimeCall::RemoveVolume {
                name: "proj_data".to_string(),
                force: true,
            },
        ]
    );

    let failed: Vec<&str> = report.failures().map(|r| r.name.as_str()).collect();
    assert_eq!(failed, vec!["web-1", "proj_back"]);
    assert!(!report.is_clean());
    assert!(runtime.has_network("proj_back"));
    assert!(!runtime.has_network("proj_front"));
}

#[tokio::test]
async fn test_unknown_network_stops_the_pass() {
    let runtime = InMemoryRuntime::new();
    runtime.add_network("proj_a").add_network("proj_c");

    let project = Project::new("proj")
        .with_network("a", Network::owned("proj_a"))
        .with_network("c", Network::owned("proj_c"));
    let names = vec!["a".to_string(), "b".to_string(), "c".to_string()];

    let engine = TeardownEngine::new(&runtime, &runtime);
    let mut report = TeardownReport::new("proj", false);
    let result = engine
        .down_networks(&project, &names, &CancelSignal::never(), &mut report)
        .await;

    assert!(matches!(result, Err(TeardownError::InvalidNetwork(name)) if name == "b"));
    assert_eq!(
        runtime.removal_calls(),
        vec![RuntimeCall::RemoveNetwork("proj_a".to_string())]
    );
    assert!(runtime.has_network("proj_c"));
    assert_eq!(report.records.len(), 1);
}

#[tokio::test]
async fn test_unknown_volume_stops_the_pass() {
    let runtime = InMemoryRuntime::new();
    runtime.add_volume("proj_logs");

    let project = Project::new("proj").with_volume("logs", Volume::owned("proj_logs"));
    let names = vec!["missing".to_string(), "logs".to_string()];

    let engine = TeardownEngine::new(&runtime, &runtime);
    let mut report = TeardownReport::new("proj", true);
    let result = engine
        .down_volumes(&project, &names, &CancelSignal::never(), &mut report)
        .await;

    assert!(matches!(result, Err(TeardownError::InvalidVolume(name)) if name == "missing"));
    assert!(runtime.calls().is_empty());
    assert!(report.records.is_empty());
}

#[tokio::test]
async fn test_container_lookup_failure_is_fatal() {
    let runtime = InMemoryRuntime::new();
    runtime
        .add_container("a", Container::new("a-1"))
        .add_container("c", Container::new("c-1"))
        .add_network("chain_default")
        .fail_lookup("b");

    let project = chain_project().with_network("default", Network::owned("chain_default"));

    let engine = TeardownEngine::new(&runtime, &runtime);
    let result = engine
        .tear_down(&project, &with_volumes(false), &CancelSignal::never())
        .await;

    match result {
        Err(TeardownError::ContainerLookup { service, .. }) => assert_eq!(service, "b"),
        other => panic!("expected a lookup failure, got {:?}", other),
    }
    assert_eq!(runtime.removal_calls(), vec![remove_container("c-1", false)]);
    assert!(runtime.has_network("chain_default"));
}

#[tokio::test]
async fn test_duplicate_service_aborts_before_any_call() {
    let runtime = InMemoryRuntime::new();
    let project = Project::new("proj").with_service("web").with_service("web");

    let engine = TeardownEngine::new(&runtime, &runtime);
    let result = engine
        .tear_down(&project, &with_volumes(false), &CancelSignal::never())
        .await;

    assert!(matches!(result, Err(TeardownError::ServiceOrder { .. })));
    assert!(runtime.calls().is_empty());
}

#[tokio::test]
async fn test_report_uses_container_name_label() {
    let runtime = InMemoryRuntime::new();
    let mut metadata = ContainerMetadata::default();
    metadata
        .labels
        .insert("nerdctl/name".to_string(), "proj-web-1".to_string());
    runtime.add_container_with_metadata("web", Container::new("0f3a9c"), metadata);
    runtime.add_container("web", Container::named("77b1de", "proj-web-2"));

    let project = Project::new("proj").with_service("web");
    let engine = TeardownEngine::new(&runtime, &runtime);
    let report = engine
        .tear_down(&project, &with_volumes(false), &CancelSignal::never())
        .await
        .unwrap();

    let names: Vec<&str> = report
        .records_of(ResourceKind::Container)
        .map(|r| r.name.as_str())
        .collect();
    assert_eq!(names, vec!["proj-web-1", "proj-web-2"]);
}

#[tokio::test]
async fn test_independent_projects_share_one_runtime() {
    let runtime = InMemoryRuntime::new();
    runtime.add_network("one_default").add_network("two_default");

    let one = Project::new("one").with_network("default", Network::owned("one_default"));
    let two = Project::new("two").with_network("default", Network::owned("two_default"));

    let engine = TeardownEngine::new(&runtime, &runtime);
    engine
        .tear_down(&one, &with_volumes(false), &CancelSignal::never())
        .await
        .unwrap();

    assert!(!runtime.has_network("one_default"));
    assert!(runtime.has_network("two_default"));

    engine
        .tear_down(&two, &with_volumes(false), &CancelSignal::never())
        .await
        .unwrap();
    assert!(!runtime.has_network("two_default"));
}

#[tokio::test]
async fn test_cancel_mid_run_stops_before_next_step() {
    let runtime = InMemoryRuntime::new();
    runtime
        .add_container("web", Container::new("web-1"))
        .add_container("web", Container::new("web-2"))
        .add_container("db", Container::new("db-1"))
        .add_network("proj_default")
        .add_volume("proj_data");

    let project = Project::new("proj")
        .with_service("db")
        .with_service("web")
        .with_network("default", Network::owned("proj_default"))
        .with_volume("data", Volume::owned("proj_data"));

    let (handle, signal) = cancel_scope();
    let executor = CancelAfterFirstContainer {
        runtime: &runtime,
        handle,
    };
    let engine = TeardownEngine::new(&runtime, &executor);
    let result = engine
        .tear_down(&project, &with_volumes(true), &signal)
        .await;

    assert!(matches!(result, Err(TeardownError::Cancelled)));
    assert_eq!(runtime.removal_calls(), vec![remove_container("web-1", true)]);
    assert!(!runtime.calls().iter().any(|call| matches!(
        call,
        RuntimeCall::NetworkExists(_) | RuntimeCall::VolumeExists(_)
    )));
    assert_eq!(runtime.container_count(), 2);
    assert!(runtime.has_network("proj_default"));
    assert!(runtime.has_volume("proj_data"));
}
