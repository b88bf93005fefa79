//! Idempotent catalog loading from YAML.
//!
//! ```yaml
//! gerencias:
//!   - nombre: Operaciones
//!     descripcion: Produccion y distribucion
//!     variables:
//!       - nombre: Agua producida
//!         unidad: m3
//! empresas:
//!   - nombre: Hidrocentro
//!     siglas: HC
//!     gerencias: [Operaciones]
//! ```

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Catalog {
    #[serde(default)]
    pub gerencias: Vec<GerenciaSeed>,
    #[serde(default)]
    pub empresas: Vec<EmpresaSeed>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GerenciaSeed {
    pub nombre: String,
    pub descripcion: Option<String>,
    #[serde(default)]
    pub variables: Vec<VariableSeed>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariableSeed {
    pub nombre: String,
    pub unidad: Option<String>,
    pub descripcion: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmpresaSeed {
    pub nombre: String,
    pub siglas: Option<String>,
    /// Names of gerencias to link
    #[serde(default)]
    pub gerencias: Vec<String>,
}

/// Rows actually inserted; existing rows are left untouched
#[derive(Debug, Default, Serialize, PartialEq)]
pub struct SeedSummary {
    pub gerencias: u64,
    pub variables: u64,
    pub empresas: u64,
    pub enlaces: u64,
}

pub fn parse(source: &str) -> anyhow::Result<Catalog> {
    let catalog: Catalog = serde_yaml::from_str(source).context("invalid catalog YAML")?;

    for gerencia in &catalog.gerencias {
        anyhow::ensure!(!gerencia.nombre.trim().is_empty(), "gerencia with an empty name");
        for variable in &gerencia.variables {
            anyhow::ensure!(
                !variable.nombre.trim().is_empty(),
                "variable with an empty name in gerencia '{}'",
                gerencia.nombre
            );
        }
    }
    for empresa in &catalog.empresas {
        anyhow::ensure!(!empresa.nombre.trim().is_empty(), "empresa with an empty name");
    }

    Ok(catalog)
}

pub async fn load(pool: &PgPool, catalog: &Catalog) -> anyhow::Result<SeedSummary> {
    let mut summary = SeedSummary::default();
    let mut tx = pool.begin().await?;

    for gerencia in &catalog.gerencias {
        summary.gerencias += sqlx::query(
            "INSERT INTO gerencias (nombre_gerencia, descripcion) VALUES ($1, $2) \
             ON CONFLICT (nombre_gerencia) DO NOTHING",
        )
        .bind(gerencia.nombre.trim())
        .bind(&gerencia.descripcion)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        for variable in &gerencia.variables {
            summary.variables += sqlx::query(
                "INSERT INTO variables (id_gerencia, nombre_variable, unidad, descripcion) \
                 SELECT id_gerencia, $2, $3, $4 FROM gerencias WHERE nombre_gerencia = $1 \
                 ON CONFLICT (id_gerencia, nombre_variable) DO NOTHING",
            )
            .bind(gerencia.nombre.trim())
            .bind(variable.nombre.trim())
            .bind(&variable.unidad)
            .bind(&variable.descripcion)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }
    }

    for empresa in &catalog.empresas {
        summary.empresas += sqlx::query(
            "INSERT INTO empresa_operadora (nombre_empresa, siglas) VALUES ($1, $2) \
             ON CONFLICT (nombre_empresa) DO NOTHING",
        )
        .bind(empresa.nombre.trim())
        .bind(&empresa.siglas)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        for nombre_gerencia in &empresa.gerencias {
            let known: bool =
                sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM gerencias WHERE nombre_gerencia = $1)")
                    .bind(nombre_gerencia.trim())
                    .fetch_one(&mut *tx)
                    .await?;
            if !known {
                tracing::warn!("Empresa '{}' references unknown gerencia '{}'", empresa.nombre, nombre_gerencia);
                continue;
            }

            summary.enlaces += sqlx::query(
                "INSERT INTO empresa_gerencia (id_empresa, id_gerencia) \
                 SELECT e.id_empresa, g.id_gerencia FROM empresa_operadora e, gerencias g \
                 WHERE e.nombre_empresa = $1 AND g.nombre_gerencia = $2 \
                 ON CONFLICT (id_empresa, id_gerencia) DO NOTHING",
            )
            .bind(empresa.nombre.trim())
            .bind(nombre_gerencia.trim())
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }
    }

    tx.commit().await?;
    Ok(summary)
}

pub async fn handle(pool: &PgPool, file: &Path, output_format: OutputFormat) -> anyhow::Result<()> {
    let source = std::fs::read_to_string(file).with_context(|| format!("cannot read {}", file.display()))?;
    let catalog = parse(&source)?;
    let summary = load(pool, &catalog).await?;

    output_success(
        &output_format,
        &format!(
            "Seeded {} gerencias, {} variables, {} empresas, {} links",
            summary.gerencias, summary.variables, summary.empresas, summary.enlaces
        ),
        Some(json!({ "inserted": summary })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_catalog() {
        let catalog = parse(
            r#"
gerencias:
  - nombre: Operaciones
    variables:
      - nombre: Agua producida
        unidad: m3
      - nombre: Perdidas
empresas:
  - nombre: Hidrocentro
    siglas: HC
    gerencias: [Operaciones]
"#,
        )
        .unwrap();

        assert_eq!(catalog.gerencias.len(), 1);
        assert_eq!(catalog.gerencias[0].variables.len(), 2);
        assert_eq!(catalog.gerencias[0].variables[0].unidad.as_deref(), Some("m3"));
        assert_eq!(catalog.empresas[0].gerencias, vec!["Operaciones".to_string()]);
    }

    #[test]
    fn sections_are_optional() {
        let catalog = parse("empresas:\n  - nombre: Hidrolara\n").unwrap();
        assert!(catalog.gerencias.is_empty());
        assert!(catalog.empresas[0].gerencias.is_empty());
    }

    #[test]
    fn rejects_blank_names_and_unknown_keys() {
        assert!(parse("gerencias:\n  - nombre: '  '\n").is_err());
        assert!(parse("empresas:\n  - nombre: X\n    color: azul\n").is_err());
    }
}
