//! Reshapes flat monthly rows into one row per variable with a column per month.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::database::models::{Hecho, Objetivo};

/// Shown for months without a captured value
pub const PLACEHOLDER: &str = "-";

/// The subset of a monthly fact or target that the matrix needs
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyRow {
    pub id_variable: i32,
    pub nombre_variable: String,
    pub unidad: Option<String>,
    pub mes: i32,
    pub valor: Option<Decimal>,
}

impl From<Hecho> for MonthlyRow {
    fn from(h: Hecho) -> Self {
        Self {
            id_variable: h.id_variable,
            nombre_variable: h.nombre_variable,
            unidad: h.unidad,
            mes: h.mes,
            valor: h.valor,
        }
    }
}

impl From<Objetivo> for MonthlyRow {
    fn from(o: Objetivo) -> Self {
        Self {
            id_variable: o.id_variable,
            nombre_variable: o.nombre_variable,
            unidad: o.unidad,
            mes: o.mes,
            valor: o.valor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixRow {
    pub id_variable: i32,
    pub nombre_variable: String,
    pub unidad: Option<String>,
    /// January..December, rendered values or the placeholder
    pub meses: [String; 12],
    pub total: Option<Decimal>,
    pub capturados: u8,
}

/// Values of one variable, indexed by month, before rendering
#[derive(Debug, Clone)]
pub(crate) struct Accumulator {
    pub id_variable: i32,
    pub nombre_variable: String,
    pub unidad: Option<String>,
    pub valores: [Option<Decimal>; 12],
}

/// Group rows by variable in order of first appearance. A later row for the
/// same variable and month replaces an earlier one; months outside 1..=12 are skipped.
pub(crate) fn group<I>(rows: I) -> Vec<Accumulator>
where
    I: IntoIterator<Item = MonthlyRow>,
{
    let mut index: HashMap<i32, usize> = HashMap::new();
    let mut grouped: Vec<Accumulator> = Vec::new();

    for row in rows {
        let slot = match month_slot(row.mes) {
            Some(slot) => slot,
            None => {
                tracing::warn!(id_variable = row.id_variable, mes = row.mes, "skipping row with invalid month");
                continue;
            }
        };

        let pos = *index.entry(row.id_variable).or_insert_with(|| {
            grouped.push(Accumulator {
                id_variable: row.id_variable,
                nombre_variable: row.nombre_variable.clone(),
                unidad: row.unidad.clone(),
                valores: [None; 12],
            });
            grouped.len() - 1
        });

        grouped[pos].valores[slot] = row.valor;
    }

    grouped
}

pub fn build<I>(rows: I) -> Vec<MatrixRow>
where
    I: IntoIterator<Item = MonthlyRow>,
{
    group(rows).into_iter().map(render).collect()
}

fn render(acc: Accumulator) -> MatrixRow {
    let captured: Vec<Decimal> = acc.valores.iter().flatten().copied().collect();
    let total = if captured.is_empty() {
        None
    } else {
        Some(captured.iter().copied().sum::<Decimal>().normalize())
    };

    MatrixRow {
        id_variable: acc.id_variable,
        nombre_variable: acc.nombre_variable,
        unidad: acc.unidad,
        meses: std::array::from_fn(|i| display(acc.valores[i])),
        total,
        capturados: captured.len() as u8,
    }
}

/// Render a value without trailing zeros, or the placeholder
pub fn display(valor: Option<Decimal>) -> String {
    match valor {
        Some(v) => v.normalize().to_string(),
        None => PLACEHOLDER.to_string(),
    }
}

pub(crate) fn month_slot(mes: i32) -> Option<usize> {
    if (1..=12).contains(&mes) {
        Some((mes - 1) as usize)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn row(id: i32, name: &str, mes: i32, valor: Option<&str>) -> MonthlyRow {
        MonthlyRow {
            id_variable: id,
            nombre_variable: name.to_string(),
            unidad: Some("m3".to_string()),
            mes,
            valor: valor.map(|v| Decimal::from_str(v).unwrap()),
        }
    }

    #[test]
    fn groups_by_variable_in_first_seen_order() {
        let rows = vec![
            row(20, "Produccion", 1, Some("100.50")),
            row(10, "Facturacion", 1, Some("80")),
            row(20, "Produccion", 2, Some("99.5000")),
        ];
        let m = build(rows);
        assert_eq!(m.len(), 2);
        assert_eq!(m[0].id_variable, 20);
        assert_eq!(m[1].id_variable, 10);
        assert_eq!(m[0].meses[0], "100.5");
        assert_eq!(m[0].meses[1], "99.5");
        assert_eq!(m[0].total, Some(Decimal::from(200)));
        assert_eq!(m[0].capturados, 2);
    }

    #[test]
    fn missing_and_null_months_use_placeholder() {
        let m = build(vec![row(1, "Perdidas", 3, None), row(1, "Perdidas", 5, Some("7"))]);
        assert_eq!(m.len(), 1);
        let meses = &m[0].meses;
        assert_eq!(meses[2], PLACEHOLDER);
        assert_eq!(meses[4], "7");
        assert_eq!(meses.iter().filter(|c| c.as_str() == PLACEHOLDER).count(), 11);
        assert_eq!(m[0].capturados, 1);
        assert_eq!(m[0].total, Some(Decimal::from(7)));
    }

    #[test]
    fn variable_with_only_nulls_has_no_total() {
        let m = build(vec![row(1, "Cobranza", 1, None)]);
        assert_eq!(m[0].total, None);
        assert_eq!(m[0].capturados, 0);
    }

    #[test]
    fn invalid_months_are_skipped() {
        let m = build(vec![row(1, "X", 0, Some("1")), row(1, "X", 13, Some("1"))]);
        assert!(m.is_empty());
    }

    #[test]
    fn later_row_replaces_earlier_for_same_month() {
        let m = build(vec![row(1, "X", 4, Some("1")), row(1, "X", 4, Some("2"))]);
        assert_eq!(m[0].meses[3], "2");
        assert_eq!(m[0].capturados, 1);
    }

    #[test]
    fn empty_input_yields_empty_matrix() {
        assert!(build(Vec::<MonthlyRow>::new()).is_empty());
    }

    #[test]
    fn serializes_months_as_array() {
        let m = build(vec![row(1, "X", 12, Some("3.10"))]);
        let v = serde_json::to_value(&m[0]).unwrap();
        assert_eq!(v["meses"].as_array().unwrap().len(), 12);
        assert_eq!(v["meses"][11], "3.1");
    }
}
