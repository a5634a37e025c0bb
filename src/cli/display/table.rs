//! Table rendering for CLI output

use super::{table_color_to_colored_str, ColorTheme, StatusIcon};
use crate::domain::cluster::descriptor::ReconcilePlan;
use crate::domain::cluster::observed::ClusterObserved;
use crate::domain::cluster::profile::{CloudProfile, VersionEntry};
use crate::domain::cluster::spec::{ClusterRef, WorkerGroupSpec};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, Color, ContentArrangement, Table};

/// Table renderer for formatted output
pub struct TableRenderer {
    theme: ColorTheme,
}

impl Default for TableRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TableRenderer {
    /// Create a new table renderer with default theme
    pub fn new() -> Self {
        Self {
            theme: ColorTheme::default(),
        }
    }

    /// Render the observed state of one cluster
    pub fn render_cluster_status(&self, observed: &ClusterObserved) -> String {
        let status_text = StatusIcon::get_status_text(observed);
        let status_color = match status_text {
            "Ready" => self.theme.success,
            "Progressing" | "Hibernated" => self.theme.warning,
            "Failed" => self.theme.error,
            _ => self.theme.muted,
        };

        let mut summary = Table::new();
        summary
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        summary.add_row(vec![
            Cell::new("📊 Shoot Cluster Status").set_alignment(CellAlignment::Center)
        ]);
        summary.add_row(vec![Cell::new(format!(
            "Cluster: {} | Region: {} | Project: {}",
            observed.cluster.name, observed.cluster.region, observed.cluster.project
        ))]);
        summary.add_row(vec![Cell::new(format!(
            "UID: {} | Kubernetes: {}",
            observed.uid.as_deref().unwrap_or("-"),
            observed.kubernetes_version
        ))]);
        summary.add_row(vec![Cell::new(format!(
            "Status: {} {}",
            StatusIcon::get_status_icon(status_text),
            status_text
        ))
        .fg(status_color)]);

        if let Some(op) = &observed.last_operation {
            summary.add_row(vec![Cell::new(format!(
                "Last operation: {} {} {} ({}%)",
                StatusIcon::get_operation_icon(&op.state),
                op.operation_type,
                op.state,
                op.progress
            ))
            .fg(self.theme.get_operation_color(&op.state))]);
        }

        for address in &observed.advertised_addresses {
            summary.add_row(vec![Cell::new(format!("🌐 {}: {}", address.name, address.url))
                .fg(self.theme.info)]);
        }

        let mut output = summary.to_string();
        output.push('\n');

        if !observed.conditions.is_empty() {
            let mut conditions = Table::new();
            conditions
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec![
                    Cell::new("CONDITION").set_alignment(CellAlignment::Left),
                    Cell::new("STATUS").set_alignment(CellAlignment::Center),
                    Cell::new("MESSAGE").set_alignment(CellAlignment::Left),
                ]);
            for c in &observed.conditions {
                conditions.add_row(vec![
                    Cell::new(&c.condition_type),
                    Cell::new(format!(
                        "{} {}",
                        StatusIcon::get_condition_icon(&c.status),
                        c.status
                    ))
                    .fg(self.theme.get_condition_color(&c.status)),
                    Cell::new(&c.message),
                ]);
            }
            output.push_str(&conditions.to_string());
            output.push('\n');
        }

        output.push_str(&self.render_worker_groups(&observed.worker_groups));
        output
    }

    /// Render worker groups as a table
    pub fn render_worker_groups(&self, worker_groups: &[WorkerGroupSpec]) -> String {
        if worker_groups.is_empty() {
            return "No worker groups\n".to_string();
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("WORKER GROUP").set_alignment(CellAlignment::Left),
                Cell::new("MACHINE").set_alignment(CellAlignment::Left),
                Cell::new("IMAGE").set_alignment(CellAlignment::Left),
                Cell::new("NODES").set_alignment(CellAlignment::Center),
                Cell::new("ZONES").set_alignment(CellAlignment::Left),
            ]);

        for wg in worker_groups {
            table.add_row(vec![
                Cell::new(&wg.name),
                Cell::new(&wg.machine_type),
                Cell::new(format!(
                    "{} {}",
                    wg.image_name,
                    wg.image_version.as_deref().unwrap_or("-")
                )),
                Cell::new(format!("{}..{}", wg.min_nodes, wg.max_nodes))
                    .set_alignment(CellAlignment::Center),
                Cell::new(wg.zones.as_ref().map(|z| z.join(",")).unwrap_or_default()),
            ]);
        }

        let mut output = table.to_string();
        output.push('\n');
        output
    }

    /// Render a dry-run plan
    pub fn render_plan(&self, cluster: &ClusterRef, plan: &ReconcilePlan) -> String {
        if plan.is_empty() {
            return format!("{} {} is up to date\n", StatusIcon::SUCCESS.green(), cluster.name);
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("ACTION").set_alignment(CellAlignment::Left),
                Cell::new("TARGET").set_alignment(CellAlignment::Left),
                Cell::new("DETAILS").set_alignment(CellAlignment::Left),
            ]);

        if let Some(update) = &plan.cluster_update {
            table.add_row(vec![
                Cell::new("~ update").fg(Color::Yellow),
                Cell::new(&cluster.name),
                Cell::new(update.changed_fields().join(", ")),
            ]);
        }
        for wg in &plan.worker_groups.to_modify {
            table.add_row(vec![
                Cell::new("~ modify").fg(Color::Yellow),
                Cell::new(&wg.name),
                Cell::new(format!("{} {}..{}", wg.machine_type, wg.min_nodes, wg.max_nodes)),
            ]);
        }
        for wg in &plan.worker_groups.to_create {
            table.add_row(vec![
                Cell::new("+ create").fg(Color::Green),
                Cell::new(&wg.name),
                Cell::new(format!("{} {}..{}", wg.machine_type, wg.min_nodes, wg.max_nodes)),
            ]);
        }
        for wg in &plan.worker_groups.to_delete {
            table.add_row(vec![
                Cell::new("- delete").fg(Color::Red),
                Cell::new(&wg.name),
                Cell::new(""),
            ]);
        }

        let steps =
            plan.worker_groups.len() + usize::from(plan.cluster_update.is_some());
        let mut output = String::new();
        output.push_str(&format!(
            "╭─ Plan for {} {} ─╮\n",
            cluster.name,
            format!("[{} steps]", steps).bright_black()
        ));
        output.push_str(&table.to_string());
        output.push('\n');
        output
    }

    /// Render Kubernetes and machine image versions of a cloud profile
    pub fn render_profile(&self, domain: &str, profile: &CloudProfile) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("COMPONENT").set_alignment(CellAlignment::Left),
                Cell::new("VERSION").set_alignment(CellAlignment::Left),
                Cell::new("CLASSIFICATION").set_alignment(CellAlignment::Left),
                Cell::new("EXPIRES").set_alignment(CellAlignment::Left),
            ]);

        for v in &profile.kubernetes_versions {
            table.add_row(self.version_row("kubernetes", v));
        }
        for image in &profile.machine_images {
            for v in &image.versions {
                table.add_row(self.version_row(&image.name, v));
            }
        }

        let mut output = format!("╭─ Cloud profile {} ─╮\n", domain.bold());
        output.push_str(&table.to_string());
        output.push('\n');

        let ok = table_color_to_colored_str(self.theme.success);
        match profile.latest_kubernetes_version() {
            Ok(v) => output.push_str(&format!("Latest supported Kubernetes: {}\n", v.color(ok))),
            Err(_) => output.push_str(&format!(
                "{}\n",
                "No supported Kubernetes version".color(table_color_to_colored_str(self.theme.error))
            )),
        }
        for image in &profile.machine_images {
            if let Ok(v) = profile.latest_machine_image_version(&image.name) {
                output.push_str(&format!("Latest supported {}: {}\n", image.name, v.color(ok)));
            }
        }
        output
    }

    fn version_row(&self, component: &str, v: &VersionEntry) -> Vec<Cell> {
        vec![
            Cell::new(component),
            Cell::new(&v.version),
            Cell::new(&v.classification).fg(self.theme.get_classification_color(&v.classification)),
            Cell::new(v.expiration_date.as_deref().unwrap_or("-")),
        ]
    }
}
