use std::collections::HashSet;

use uuid::Uuid;

use notionary::config::NotionaryConfig;
use notionary::store::ClientStore;
use notionary::sync::api::ApiClient;
use notionary::sync::session::SessionProvider;
use notionary::sync::{SyncEngine, SyncStatus};

#[tokio::main]
async fn main() {
    let config = NotionaryConfig::load();

    // Set up logging to the systemd user journal (`journalctl --user -t notionary -f`).
    // Wrapper filters: notionary crate at info/debug (per config), everything else at warn.
    {
        struct FilteredJournal {
            inner: systemd_journal_logger::JournalLog,
        }

        impl log::Log for FilteredJournal {
            fn enabled(&self, metadata: &log::Metadata) -> bool {
                let target = metadata.target();
                if target.starts_with("notionary") {
                    let max = if notionary::debug_logging() {
                        log::LevelFilter::Debug
                    } else {
                        log::LevelFilter::Info
                    };
                    metadata.level() <= max
                } else {
                    metadata.level() <= log::LevelFilter::Warn
                }
            }
            fn log(&self, record: &log::Record) {
                if self.enabled(record.metadata()) {
                    self.inner.log(record);
                }
            }
            fn flush(&self) {
                self.inner.flush();
            }
        }

        let journal = systemd_journal_logger::JournalLog::new()
            .unwrap()
            .with_syslog_identifier("notionary".to_string());

        notionary::set_debug_logging(config.debug_logging);

        log::set_boxed_logger(Box::new(FilteredJournal { inner: journal })).unwrap();
        // Global max must be Debug so crate debug logs can pass through when toggled
        log::set_max_level(log::LevelFilter::Debug);
    }

    // The saved theme applies before the first frame; the check just reports it.
    log::info!("Starting with {} theme", config.theme);

    println!("=== Notionary workspace check ===\n");

    let provider = match SessionProvider::new(&config.api_base_url) {
        Ok(p) => p,
        Err(e) => {
            println!("Failed to set up HTTP client: {}", e);
            return;
        }
    };

    let auth = match provider.resume().await {
        Ok(Some(auth)) => auth,
        Ok(None) => {
            println!("No session. Sign in from the app first.");
            return;
        }
        Err(e) => {
            println!("Session check failed: {}", e);
            return;
        }
    };
    println!("Signed in as {} <{}>\n", auth.session.name, auth.session.email);

    let api = match ApiClient::new(&config.api_base_url, &auth.token) {
        Ok(api) => api,
        Err(e) => {
            println!("Failed to set up HTTP client: {}", e);
            return;
        }
    };
    let sync = SyncEngine::new(api);
    let mut store = ClientStore::new();
    let status = match sync.load_all(&mut store).await {
        Ok(()) => SyncStatus::LastSynced(chrono::Local::now().format("%H:%M:%S").to_string()),
        Err(e) => SyncStatus::Error(e.to_string()),
    };
    match &status {
        SyncStatus::Error(msg) => {
            println!("Failed to load data: {}", msg);
            return;
        }
        SyncStatus::LastSynced(at) => println!("Loaded at {}\n", at),
        SyncStatus::Idle | SyncStatus::Syncing => {}
    }

    for ws in store.workspaces() {
        let notes = store
            .notes()
            .iter()
            .filter(|n| n.workspace_id == Some(ws.id) || (n.workspace_id.is_none() && ws.is_default))
            .count();
        let groups = store
            .groups()
            .iter()
            .filter(|g| g.workspace_id == Some(ws.id) || (g.workspace_id.is_none() && ws.is_default))
            .count();
        let marker = if ws.is_default { " (default)" } else { "" };
        println!("--- {}{} ---", ws.name, marker);
        println!("  {} notes, {} groups", notes, groups);
    }
    println!();

    let mut warnings = 0;

    let defaults = store.workspaces().iter().filter(|w| w.is_default).count();
    if defaults != 1 {
        warnings += 1;
        println!(
            "WARN: {} workspaces flagged as default (expected exactly 1)",
            defaults
        );
    }

    for group in store.groups() {
        let members = store.group_members(group.id).len();
        if members < 2 {
            warnings += 1;
            println!(
                "WARN: group '{}' has {} member(s), should have been dissolved",
                group.name, members
            );
        }
    }

    let group_ids: HashSet<Uuid> = store.groups().iter().map(|g| g.id).collect();
    for note in store.notes() {
        if let Some(gid) = note.group_id {
            if !group_ids.contains(&gid) {
                warnings += 1;
                println!("WARN: note '{}' references missing group {}", note.title, gid);
            }
        }
    }

    let unfiled = store
        .notes()
        .iter()
        .filter(|n| n.workspace_id.is_none())
        .count();
    if unfiled > 0 {
        println!(
            "note: {} item(s) predate workspaces and file under the default one",
            unfiled
        );
    }

    if warnings == 0 {
        println!("All checks passed.");
    } else {
        println!("\n{} warning(s).", warnings);
    }
}
