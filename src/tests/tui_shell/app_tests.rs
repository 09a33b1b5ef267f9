use std::collections::BTreeMap;
use std::fs;

use anyhow::anyhow;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::*;
use crate::catalog::FieldMeta;
use crate::config::{ClusterOptions, Settings};
use crate::lifecycle::{SequenceReport, SoftFailure, StepFailure};
use crate::model::{Preset, PresetValue};
use crate::tui::TuiRunOptions;

fn key(code: KeyCode) -> AppEvent {
    AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn ctrl(c: char) -> AppEvent {
    AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
}

fn preset(name: &str, values: &[(&str, PresetValue)]) -> Preset {
    Preset {
        name: name.to_string(),
        values: values
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect::<BTreeMap<_, _>>(),
    }
}

fn text(s: &str) -> PresetValue {
    PresetValue::Text(s.to_string())
}

fn test_app(apps: &std::path::Path) -> anyhow::Result<App> {
    let settings = Settings::parse(&format!(
        "apps_path: {}\ntemplate_path: /nonexistent/template\npresets_path: /nonexistent/presets\ns3_bucket: state-bucket\n",
        apps.display()
    ))?;
    let catalog = FieldCatalog::from_fields([
        (
            "vm_app",
            FieldMeta {
                label: "Application".to_string(),
                help: "Short application name".to_string(),
                kind: "string".to_string(),
                ..FieldMeta::default()
            },
        ),
        (
            "platform_id",
            FieldMeta {
                label: "Platform ID".to_string(),
                read_only: true,
                ..FieldMeta::default()
            },
        ),
    ]);
    let presets = vec![
        preset(
            "small",
            &[
                ("vm_app", text("web")),
                ("zone", text("dmz")),
                ("vm_memory", PresetValue::Integer(2048)),
                ("vm_disk_size", PresetValue::List(vec!["20".into(), "40".into()])),
            ],
        ),
        preset("large", &[("vm_memory", PresetValue::Integer(8192))]),
    ];
    Ok(App::new(TuiRunOptions {
        settings,
        catalog,
        presets,
        options: ClusterOptions::default(),
    }))
}

fn focus(form: &mut Form, key: &str) {
    if let Some(idx) = form.fields.iter().position(|f| f.key == key) {
        form.focus = idx;
    }
}

#[test]
fn cycle_option_wraps_both_ways() {
    let options: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
    assert_eq!(cycle_option("c", &options, 1), "a");
    assert_eq!(cycle_option("a", &options, -1), "c");
    assert_eq!(cycle_option("b", &options, 1), "c");
    assert_eq!(cycle_option("zzz", &options, -1), "a");
    assert_eq!(cycle_option("keep", &[], 1), "keep");
}

#[test]
fn cycle_option_forward_then_backward_is_identity() {
    let lists: [&[&str]; 2] = [&["a", "b", "c"], &["only"]];
    for list in lists {
        let options: Vec<String> = list.iter().map(|s| s.to_string()).collect();
        for start in &options {
            for n in 1..=options.len() {
                let mut v = start.clone();
                for _ in 0..n {
                    v = cycle_option(&v, &options, 1);
                }
                if n == options.len() {
                    assert_eq!(&v, start, "{} steps around {:?}", n, options);
                }
                for _ in 0..n {
                    v = cycle_option(&v, &options, -1);
                }
                assert_eq!(&v, start, "{} steps forward and back in {:?}", n, options);
            }
        }
    }
    assert_eq!(cycle_option("only", &["only".to_string()], 1), "only");
}

#[test]
fn initial_preset_fills_create_form() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let app = test_app(dir.path())?;
    assert_eq!(app.scene(), Scene::Launcher);
    assert_eq!(app.create.value("vm_app"), Some("web"));
    assert_eq!(app.create.value("vm_memory"), Some("2048"));
    assert_eq!(app.create.value("vm_disk_size"), Some("20,40"));
    Ok(())
}

#[test]
fn preset_cycling_wraps_and_overwrites_known_fields() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut app = test_app(dir.path())?;
    app.handle_event(key(KeyCode::Char('n')));
    assert_eq!(app.scene(), Scene::CreateForm);

    app.handle_event(key(KeyCode::F(3)));
    assert_eq!(app.active_preset().map(|p| p.name.as_str()), Some("large"));
    assert_eq!(app.create.value("vm_memory"), Some("8192"));
    // "large" has no vm_app; the previous text stays.
    assert_eq!(app.create.value("vm_app"), Some("web"));

    app.handle_event(key(KeyCode::F(3)));
    assert_eq!(app.active_preset().map(|p| p.name.as_str()), Some("small"));
    app.handle_event(key(KeyCode::F(2)));
    assert_eq!(app.active_preset().map(|p| p.name.as_str()), Some("large"));
    Ok(())
}

#[test]
fn escape_and_ctrl_c_leave_create_form() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut app = test_app(dir.path())?;
    app.handle_event(key(KeyCode::Char('n')));
    app.handle_event(key(KeyCode::Esc));
    assert_eq!(app.scene(), Scene::Launcher);
    assert!(!app.should_quit());

    app.handle_event(key(KeyCode::Char('n')));
    app.handle_event(ctrl('c'));
    assert_eq!(app.scene(), Scene::Launcher);
    Ok(())
}

#[test]
fn typing_is_ignored_on_cycle_only_fields() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut app = test_app(dir.path())?;
    app.handle_event(key(KeyCode::Char('n')));
    focus(&mut app.create, "zone");
    app.handle_event(key(KeyCode::Char('x')));
    assert_eq!(app.create.value("zone"), Some("dmz"));

    app.handle_event(key(KeyCode::Right));
    assert_eq!(app.create.value("zone"), Some("standard"));
    app.handle_event(key(KeyCode::Left));
    app.handle_event(key(KeyCode::Left));
    assert_eq!(app.create.value("zone"), Some("admin"));

    focus(&mut app.create, "vm_app");
    app.handle_event(key(KeyCode::Char('x')));
    assert_eq!(app.create.value("vm_app"), Some("webx"));
    app.handle_event(ctrl('u'));
    assert_eq!(app.create.value("vm_app"), Some(""));
    Ok(())
}

#[test]
fn cluster_change_requests_templates_and_drops_stale_results() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut app = test_app(dir.path())?;
    app.handle_event(key(KeyCode::Char('n')));
    focus(&mut app.create, "cluster");

    let Some(Task::Fetch(first)) = app.handle_event(key(KeyCode::Right)) else {
        panic!("expected a template fetch");
    };
    assert_eq!(first.cluster, "cl10400");
    assert!(app.is_fetching());
    assert!(!app.is_busy());

    let Some(Task::Fetch(second)) = app.handle_event(key(KeyCode::Right)) else {
        panic!("expected a second template fetch");
    };
    assert_eq!(second.cluster, "cl12600k");
    assert!(second.seq > first.seq);

    app.handle_event(AppEvent::TemplatesFetched {
        seq: second.seq,
        cluster: second.cluster.clone(),
        result: Ok(vec!["ubuntu-server-24.04.2".into(), "ubuntu-server-24.04.1".into()]),
    });
    assert!(!app.is_fetching());
    assert_eq!(app.create.value("vm_template"), Some("ubuntu-server-24.04.2"));

    // Late delivery of the superseded request changes nothing.
    app.handle_event(AppEvent::TemplatesFetched {
        seq: first.seq,
        cluster: first.cluster,
        result: Ok(vec!["stale".into()]),
    });
    assert_eq!(app.templates, vec!["ubuntu-server-24.04.2", "ubuntu-server-24.04.1"]);
    assert_eq!(app.create.value("vm_template"), Some("ubuntu-server-24.04.2"));

    focus(&mut app.create, "vm_template");
    app.handle_event(key(KeyCode::Char(' ')));
    assert_eq!(app.create.value("vm_template"), Some("ubuntu-server-24.04.1"));
    Ok(())
}

#[test]
fn failed_fetch_clears_templates_and_reports() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut app = test_app(dir.path())?;
    app.templates = vec!["old".into()];
    app.handle_event(key(KeyCode::Char('n')));
    focus(&mut app.create, "cluster");
    let Some(Task::Fetch(req)) = app.handle_event(key(KeyCode::Right)) else {
        panic!("expected a template fetch");
    };

    app.handle_event(AppEvent::TemplatesFetched {
        seq: req.seq,
        cluster: req.cluster,
        result: Err("vault approle credentials not set".into()),
    });
    assert!(!app.is_fetching());
    assert!(app.templates.is_empty());
    let status = app.status().cloned().ok_or_else(|| anyhow!("no status"))?;
    assert_eq!(status.kind, StatusKind::Error);
    assert!(status.text.contains("vault approle credentials not set"));
    Ok(())
}

#[test]
fn busy_session_defers_quit_until_task_finishes() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut app = test_app(dir.path())?;
    app.handle_event(key(KeyCode::Char('n')));

    let task = app.handle_event(key(KeyCode::Enter));
    assert!(matches!(
        task,
        Some(Task::Lifecycle(LifecycleTask::Create { .. }))
    ));
    assert!(app.is_busy());

    let before = app.create.values();
    assert!(app.handle_event(key(KeyCode::F(3))).is_none());
    assert!(app.handle_event(key(KeyCode::Tab)).is_none());
    assert_eq!(app.create.values(), before);
    assert_eq!(app.create.focus, 0);
    assert_eq!(app.scene(), Scene::CreateForm);

    app.handle_event(key(KeyCode::Char('q')));
    assert!(!app.should_quit());
    assert!(app.is_quit_pending());
    assert!(app.is_busy());

    app.handle_event(AppEvent::TaskFinished(TaskOutcome {
        kind: TaskKind::Create,
        result: Ok(SequenceReport {
            name: "proxmox_web_dmz_01".to_string(),
            ..SequenceReport::default()
        }),
    }));
    assert!(!app.is_busy());
    assert!(app.should_quit());
    Ok(())
}

#[test]
fn name_collision_keeps_create_form() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut app = test_app(dir.path())?;
    app.handle_event(key(KeyCode::Char('n')));
    app.handle_event(key(KeyCode::Enter));

    app.handle_event(AppEvent::TaskFinished(TaskOutcome {
        kind: TaskKind::Create,
        result: Err(StepFailure {
            step: Step::CheckTarget,
            error: anyhow!("Deployment 'proxmox_web_dmz_' already exists!"),
        }),
    }));
    assert!(!app.is_busy());
    assert_eq!(app.scene(), Scene::CreateForm);
    assert_eq!(
        app.status().map(|s| s.text.as_str()),
        Some("Deployment 'proxmox_web_dmz_' already exists!")
    );
    Ok(())
}

#[test]
fn create_that_ran_returns_to_launcher() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut app = test_app(dir.path())?;
    app.handle_event(key(KeyCode::Char('n')));
    app.handle_event(key(KeyCode::Enter));
    app.handle_event(AppEvent::TaskFinished(TaskOutcome {
        kind: TaskKind::Create,
        result: Err(StepFailure {
            step: Step::Init,
            error: anyhow!("terraform init failed: exit status: 1"),
        }),
    }));
    assert_eq!(app.scene(), Scene::Launcher);
    assert_eq!(app.status().map(|s| s.kind), Some(StatusKind::Error));

    app.handle_event(key(KeyCode::Char('n')));
    app.handle_event(key(KeyCode::Enter));
    app.handle_event(AppEvent::TaskFinished(TaskOutcome {
        kind: TaskKind::Create,
        result: Ok(SequenceReport {
            name: "proxmox_web_dmz_".to_string(),
            ..SequenceReport::default()
        }),
    }));
    assert_eq!(app.scene(), Scene::Launcher);
    assert_eq!(app.status().map(|s| s.kind), Some(StatusKind::Info));
    Ok(())
}

#[test]
fn unreadable_parameters_keep_launcher() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    fs::create_dir(dir.path().join("proxmox_db_admin_02"))?;
    let mut app = test_app(dir.path())?;
    assert_eq!(app.deployments.len(), 1);

    app.handle_event(key(KeyCode::Char('e')));
    assert_eq!(app.scene(), Scene::Launcher);
    assert_eq!(app.status().map(|s| s.kind), Some(StatusKind::Error));
    Ok(())
}

#[test]
fn edit_form_skips_read_only_fields_and_saves() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let deployment = dir.path().join("proxmox_web_dmz_01");
    fs::create_dir(&deployment)?;
    fs::write(
        deployment.join("terraform.tfvars"),
        "# managed\nvm_app = \"web\"\nplatform_id = 01\nvm_disk_size = [\"20\", \"40\"]\nzone = \"dmz\"\n",
    )?;
    let mut app = test_app(dir.path())?;

    app.handle_event(key(KeyCode::Enter));
    assert_eq!(app.scene(), Scene::EditForm);
    assert_eq!(app.edit.value("platform_id"), None);
    assert_eq!(app.edit.value("vm_app"), Some("web"));
    assert_eq!(app.edit.value("vm_disk_size"), Some("20,40"));

    focus(&mut app.edit, "vm_app");
    app.handle_event(key(KeyCode::Char('2')));
    app.handle_event(key(KeyCode::Enter));
    assert_eq!(app.scene(), Scene::EditForm);
    assert_eq!(app.status().map(|s| s.kind), Some(StatusKind::Info));

    let saved = fs::read_to_string(deployment.join("terraform.tfvars"))?;
    assert!(saved.starts_with("# managed\n"));
    assert!(saved.contains("vm_app = \"web2\"\n"));
    assert!(saved.contains("platform_id = 01\n"));
    assert!(saved.contains("vm_disk_size = [\"20\", \"40\"]\n"));

    let task = app.handle_event(ctrl('a'));
    assert_eq!(
        task,
        Some(Task::Lifecycle(LifecycleTask::Apply {
            dir: deployment.clone()
        }))
    );
    Ok(())
}

#[test]
fn destroy_confirmation_can_be_canceled() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    fs::create_dir(dir.path().join("proxmox_web_dmz_01"))?;
    let mut app = test_app(dir.path())?;

    app.handle_event(key(KeyCode::Char('d')));
    assert_eq!(app.scene(), Scene::ConfirmDestroy);
    assert_eq!(
        app.pending_destroy().map(|d| d.name.as_str()),
        Some("proxmox_web_dmz_01")
    );

    app.handle_event(key(KeyCode::Char('n')));
    assert_eq!(app.scene(), Scene::Launcher);
    assert!(app.pending_destroy().is_none());
    assert_eq!(app.status().map(|s| s.text.as_str()), Some("Destroy canceled."));
    Ok(())
}

#[test]
fn plan_destroy_stays_and_destroy_returns_to_launcher() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let deployment = dir.path().join("proxmox_web_dmz_01");
    fs::create_dir(&deployment)?;
    let mut app = test_app(dir.path())?;
    app.handle_event(key(KeyCode::Char('d')));

    let task = app.handle_event(key(KeyCode::Char('p')));
    assert_eq!(
        task,
        Some(Task::Lifecycle(LifecycleTask::PlanDestroy {
            dir: deployment.clone()
        }))
    );
    app.handle_event(AppEvent::TaskFinished(TaskOutcome {
        kind: TaskKind::PlanDestroy,
        result: Ok(SequenceReport::default()),
    }));
    assert_eq!(app.scene(), Scene::ConfirmDestroy);

    let task = app.handle_event(key(KeyCode::Char('y')));
    assert!(matches!(
        task,
        Some(Task::Lifecycle(LifecycleTask::Destroy { .. }))
    ));
    app.handle_event(AppEvent::TaskFinished(TaskOutcome {
        kind: TaskKind::Destroy,
        result: Ok(SequenceReport {
            name: "proxmox_web_dmz_01".to_string(),
            completed: vec![Step::Destroy, Step::MarkDestroyed, Step::PurgeRemoteState],
            soft_failures: vec![SoftFailure {
                step: Step::RemoveDirectory,
                message: "permission denied".to_string(),
            }],
        }),
    }));
    assert_eq!(app.scene(), Scene::Launcher);
    assert!(app.pending_destroy().is_none());
    assert_eq!(
        app.status().map(|s| s.text.as_str()),
        Some("Destroyed, but failed to delete directory: permission denied")
    );
    Ok(())
}

#[test]
fn remote_cleanup_failure_reports_destroy_as_info() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    fs::create_dir(dir.path().join("proxmox_web_dmz_01"))?;
    let mut app = test_app(dir.path())?;
    app.handle_event(key(KeyCode::Char('d')));
    let task = app.handle_event(key(KeyCode::Char('y')));
    assert!(matches!(
        task,
        Some(Task::Lifecycle(LifecycleTask::Destroy { .. }))
    ));

    app.handle_event(AppEvent::TaskFinished(TaskOutcome {
        kind: TaskKind::Destroy,
        result: Ok(SequenceReport {
            name: "proxmox_web_dmz_01".to_string(),
            completed: vec![Step::Destroy, Step::MarkDestroyed, Step::RemoveDirectory],
            soft_failures: vec![SoftFailure {
                step: Step::PurgeRemoteState,
                message: "AccessDenied".to_string(),
            }],
        }),
    }));
    assert_eq!(app.scene(), Scene::Launcher);
    let status = app.status().ok_or_else(|| anyhow::anyhow!("no status"))?;
    assert_eq!(status.kind, StatusKind::Info);
    assert!(status.text.starts_with("Destroyed"));
    assert!(!status.text.contains("AccessDenied"));
    Ok(())
}

#[test]
fn launcher_selection_stays_in_range() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    fs::create_dir(dir.path().join("a"))?;
    fs::create_dir(dir.path().join("b"))?;
    let mut app = test_app(dir.path())?;

    app.handle_event(key(KeyCode::Char('k')));
    assert_eq!(app.selected, 0);
    app.handle_event(key(KeyCode::Char('j')));
    app.handle_event(key(KeyCode::Down));
    assert_eq!(app.selected, 1);

    app.handle_event(key(KeyCode::Char('q')));
    assert!(app.should_quit());
    Ok(())
}
