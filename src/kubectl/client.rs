/// kubectl operations: listing, usage reporting, deletion
use anyhow::Result;
use std::path::PathBuf;
use tracing::debug;

use crate::kubectl::command::{self, Kubectl};
use crate::table::{Cell, Table};
use crate::units;

/// Client carrying the invocation defaults for one kubectl binary.
///
/// Holds no connection state: every operation spawns a fresh process, so
/// concurrent calls are independent.
pub struct KubectlClient {
    program: String,
    kubeconfig: Option<PathBuf>,
}

impl KubectlClient {
    pub fn new(program: impl Into<String>, kubeconfig: Option<PathBuf>) -> Self {
        Self {
            program: program.into(),
            kubeconfig,
        }
    }

    /// Check that the configured kubectl binary is runnable.
    pub async fn check_installed(&self) -> Result<()> {
        command::check_kubectl_installed(&self.program).await
    }

    fn invoke(&self) -> Kubectl {
        Kubectl::new(&self.program).kubeconfig(self.kubeconfig.as_deref())
    }

    /// Run `kubectl get <kind> -o wide` and reshape the output.
    ///
    /// Incomplete rows are dropped, the age column is normalized to minutes,
    /// and when a node column is present the full node name moves to a
    /// `fullnode` column while `node` keeps only the part after the last
    /// hyphen.
    pub async fn get_all(&self, kind: &str, namespace: &str) -> Result<Table> {
        debug!("Listing {} in namespace {}", kind, namespace);

        let stdout = self
            .invoke()
            .args(["get", kind, "-o", "wide"])
            .namespace(namespace)
            .context(format!("Failed to run {} get {}", self.program, kind))
            .run()
            .await?;

        let table = reshape_listing(Table::parse_wide(&stdout)?);
        debug!("Parsed {} {} rows", table.len(), kind);
        Ok(table)
    }

    /// Run `kubectl top <kind>` and return rows sorted by cpu, descending.
    pub async fn top(&self, kind: &str, namespace: &str) -> Result<Table> {
        debug!("Reading {} usage in namespace {}", kind, namespace);

        let stdout = self
            .invoke()
            .args(["top", kind])
            .namespace(namespace)
            .context(format!("Failed to run {} top {}", self.program, kind))
            .run()
            .await?;

        let table = reshape_usage(Table::parse_packed(&stdout)?);
        debug!("Parsed {} {} usage rows", table.len(), kind);
        Ok(table)
    }

    /// Run `kubectl delete <kind> <name>`, optionally forcing immediate
    /// termination. Only the exit status matters; a non-zero exit is an
    /// error and suppresses the confirmation line.
    pub async fn delete(
        &self,
        name: &str,
        kind: &str,
        namespace: &str,
        force: bool,
        verbose: bool,
    ) -> Result<()> {
        debug!("Deleting {} {} in namespace {}", kind, name, namespace);

        self.invoke()
            .args(delete_args(kind, name, namespace, force))
            .context(format!(
                "Failed to run {} delete {} {}",
                self.program, kind, name
            ))
            .run_silent()
            .await?;

        if verbose {
            println!("Deleted {}: {}", kind, name);
        }

        Ok(())
    }
}

/// Reshape a parsed `get` table: drop rows without an age, normalize the age
/// to minutes, derive the short node name.
fn reshape_listing(mut table: Table) -> Table {
    table.drop_rows_missing("age");
    table.map_column("age", |cell| match cell.as_str() {
        Some(raw) => units::age_to_minutes(raw),
        None => cell.clone(),
    });

    if table.column("node").is_some() {
        table.duplicate_column("node", "fullnode");
        table.map_column("node", |cell| match cell.as_str() {
            Some(raw) => Cell::text(short_node_name(raw)),
            None => cell.clone(),
        });
    }

    table
}

/// Reshape a parsed `top` table: normalize cpu and memory, rename both
/// columns, sort by cpu descending. Rows that fail normalization are
/// dropped.
fn reshape_usage(mut table: Table) -> Table {
    table.filter_map_column("cpu(cores)", |cell| match cell.as_str() {
        Some(raw) => units::cpu_millicores(raw).map(Cell::Int),
        None => Some(cell.clone()),
    });
    table.rename_column("cpu(cores)", "cpu");

    table.filter_map_column("memory(bytes)", |cell| match cell.as_str() {
        Some(raw) => units::memory_scaled(raw),
        None => Some(cell.clone()),
    });
    table.rename_column("memory(bytes)", "memory");

    table.sort_desc_by("cpu");
    table
}

/// Argument list for a delete invocation. Force requests a zero grace
/// period and immediate termination.
fn delete_args(kind: &str, name: &str, namespace: &str, force: bool) -> Vec<String> {
    let mut args = vec![
        "delete".to_string(),
        kind.to_string(),
        name.to_string(),
        format!("--namespace={}", namespace),
    ];
    if force {
        args.push("--grace-period=0".to_string());
        args.push("--force".to_string());
    }
    args
}

/// Everything after the last hyphen of a full node name.
fn short_node_name(full: &str) -> &str {
    full.rsplit('-').next().unwrap_or(full)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GET_FIXTURE: &str = "\
NAME                  READY   STATUS    RESTARTS   AGE   IP          NODE
worker-6d4f9c-abcde   1/1     Running   0          2h    10.0.1.17   ip-10-0-1-23.ec2.internal
worker-6d4f9c-fghij   1/1     Running   3          90s   10.0.1.18   ip-10-0-1-24.ec2.internal

";

    const TOP_FIXTURE: &str = "\
NAME                  CPU(cores)   MEMORY(bytes)
worker-6d4f9c-abcde   100m         512Mi
worker-6d4f9c-fghij   250m         2Gi
worker-6d4f9c-klmno   100m         128Mi
";

    #[test]
    fn test_reshape_listing_normalizes_age() {
        let table = reshape_listing(Table::parse_wide(GET_FIXTURE).unwrap());
        assert_eq!(table.get(0, "age"), Some(&Cell::Float(120.0)));
        assert_eq!(table.get(1, "age"), Some(&Cell::Float(1.5)));
    }

    #[test]
    fn test_reshape_listing_node_columns() {
        let table = reshape_listing(Table::parse_wide(GET_FIXTURE).unwrap());
        assert_eq!(table.get(0, "node"), Some(&Cell::text("23.ec2.internal")));
        assert_eq!(
            table.get(0, "fullnode"),
            Some(&Cell::text("ip-10-0-1-23.ec2.internal"))
        );
    }

    #[test]
    fn test_reshape_listing_without_node_column() {
        let text = "NAME    AGE\nsvc-a   3d\n";
        let table = reshape_listing(Table::parse_wide(text).unwrap());
        assert_eq!(table.columns(), ["name", "age"]);
        assert_eq!(table.get(0, "age"), Some(&Cell::Float(4320.0)));
    }

    #[test]
    fn test_reshape_listing_keeps_unparsed_age() {
        let text = "NAME    AGE\nsvc-a   N/A\n";
        let table = reshape_listing(Table::parse_wide(text).unwrap());
        assert_eq!(table.get(0, "age"), Some(&Cell::text("N/A")));
    }

    #[test]
    fn test_reshape_usage_sorts_by_cpu_desc() {
        let table = reshape_usage(Table::parse_packed(TOP_FIXTURE).unwrap());
        assert_eq!(table.columns(), ["name", "cpu", "memory"]);
        assert_eq!(table.len(), 3);

        assert_eq!(
            table.get(0, "name"),
            Some(&Cell::text("worker-6d4f9c-fghij"))
        );
        assert_eq!(table.get(0, "cpu"), Some(&Cell::Int(250)));
        // Ties keep their original order.
        assert_eq!(
            table.get(1, "name"),
            Some(&Cell::text("worker-6d4f9c-abcde"))
        );
        assert_eq!(
            table.get(2, "name"),
            Some(&Cell::text("worker-6d4f9c-klmno"))
        );
    }

    #[test]
    fn test_reshape_usage_memory_scaling() {
        let table = reshape_usage(Table::parse_packed(TOP_FIXTURE).unwrap());
        assert_eq!(table.get(1, "memory"), Some(&Cell::Float(0.512)));
        assert_eq!(table.get(0, "memory"), Some(&Cell::text("2Gi")));
    }

    #[test]
    fn test_reshape_usage_drops_bad_cpu_rows() {
        let text = "NAME   CPU(cores)   MEMORY(bytes)\npod-a  broken  512Mi\npod-b  100m  128Mi\n";
        let table = reshape_usage(Table::parse_packed(text).unwrap());
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0, "name"), Some(&Cell::text("pod-b")));
    }

    #[test]
    fn test_delete_args_plain() {
        assert_eq!(
            delete_args("pod", "worker-6d4f9c-abcde", "prod", false),
            [
                "delete",
                "pod",
                "worker-6d4f9c-abcde",
                "--namespace=prod"
            ]
        );
    }

    #[test]
    fn test_delete_args_force() {
        let args = delete_args("pod", "worker-6d4f9c-abcde", "staging", true);
        assert_eq!(
            args,
            [
                "delete",
                "pod",
                "worker-6d4f9c-abcde",
                "--namespace=staging",
                "--grace-period=0",
                "--force"
            ]
        );
    }

    #[tokio::test]
    async fn test_delete_failure_propagates() {
        // `false` exits non-zero no matter the arguments.
        let client = KubectlClient::new("false", None);
        let result = client.delete("pod-a", "pod", "prod", false, true).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_delete_success() {
        let client = KubectlClient::new("true", None);
        let result = client.delete("pod-a", "pod", "prod", true, false).await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_short_node_name() {
        assert_eq!(short_node_name("ip-10-0-1-23.ec2.internal"), "23.ec2.internal");
        assert_eq!(short_node_name("nodename"), "nodename");
    }
}
