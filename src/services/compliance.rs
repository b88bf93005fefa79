//! Actual-versus-target comparison per variable and month.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;

use super::matrix::{group, Accumulator, MonthlyRow};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceCell {
    pub real: Option<Decimal>,
    pub objetivo: Option<Decimal>,
    pub porcentaje: Option<Decimal>,
}

impl ComplianceCell {
    pub fn new(real: Option<Decimal>, objetivo: Option<Decimal>) -> Self {
        Self {
            real,
            objetivo,
            porcentaje: percentage(real, objetivo),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceRow {
    pub id_variable: i32,
    pub nombre_variable: String,
    pub unidad: Option<String>,
    pub meses: Vec<ComplianceCell>,
    pub anual: ComplianceCell,
}

/// `real / objetivo * 100` rounded to two decimals; undefined without both
/// values or with a zero target
pub fn percentage(real: Option<Decimal>, objetivo: Option<Decimal>) -> Option<Decimal> {
    let (real, objetivo) = (real?, objetivo?);
    if objetivo.is_zero() {
        return None;
    }
    real.checked_div(objetivo)?
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|p| p.round_dp(2).normalize())
}

/// Join actual values with targets. Variables follow the order of the targets,
/// then any variable that only has actual values.
pub fn build<R, O>(reales: R, objetivos: O) -> Vec<ComplianceRow>
where
    R: IntoIterator<Item = MonthlyRow>,
    O: IntoIterator<Item = MonthlyRow>,
{
    let targets = group(objetivos);
    let mut actuals: HashMap<i32, Accumulator> =
        group(reales).into_iter().map(|acc| (acc.id_variable, acc)).collect();

    let mut paired: Vec<(Option<Accumulator>, Option<Accumulator>)> = targets
        .into_iter()
        .map(|target| (actuals.remove(&target.id_variable), Some(target)))
        .collect();

    // Remaining actual-only variables, kept in a stable order
    let mut leftovers: Vec<Accumulator> = actuals.into_values().collect();
    leftovers.sort_by(|a, b| a.nombre_variable.cmp(&b.nombre_variable).then(a.id_variable.cmp(&b.id_variable)));
    paired.extend(leftovers.into_iter().map(|actual| (Some(actual), None)));

    paired
        .into_iter()
        .filter_map(|(actual, target)| {
            let head = target.as_ref().or(actual.as_ref())?;
            let (id_variable, nombre_variable, unidad) =
                (head.id_variable, head.nombre_variable.clone(), head.unidad.clone());

            let real = actual.map(|a| a.valores).unwrap_or([None; 12]);
            let objetivo = target.map(|t| t.valores).unwrap_or([None; 12]);
            let meses = (0..12).map(|i| ComplianceCell::new(real[i], objetivo[i])).collect();

            Some(ComplianceRow {
                id_variable,
                nombre_variable,
                unidad,
                meses,
                anual: ComplianceCell::new(sum(&real), sum(&objetivo)),
            })
        })
        .collect()
}

fn sum(valores: &[Option<Decimal>; 12]) -> Option<Decimal> {
    let mut present = valores.iter().flatten().peekable();
    present.peek()?;
    Some(present.copied().sum::<Decimal>().normalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn row(id: i32, name: &str, mes: i32, valor: Option<&str>) -> MonthlyRow {
        MonthlyRow {
            id_variable: id,
            nombre_variable: name.into(),
            unidad: None,
            mes,
            valor: valor.map(d),
        }
    }

    #[test]
    fn percentage_rules() {
        assert_eq!(percentage(Some(d("50")), Some(d("200"))), Some(d("25")));
        assert_eq!(percentage(Some(d("1")), Some(d("3"))), Some(d("33.33")));
        assert_eq!(percentage(Some(d("5")), Some(Decimal::ZERO)), None);
        assert_eq!(percentage(None, Some(d("5"))), None);
        assert_eq!(percentage(Some(d("5")), None), None);
    }

    #[test]
    fn joins_actuals_with_targets() {
        let reales = vec![row(1, "Produccion", 1, Some("90")), row(1, "Produccion", 2, Some("110"))];
        let objetivos = vec![row(1, "Produccion", 1, Some("100")), row(1, "Produccion", 2, Some("100"))];
        let rows = build(reales, objetivos);
        assert_eq!(rows.len(), 1);
        let r = &rows[0];
        assert_eq!(r.meses.len(), 12);
        assert_eq!(r.meses[0].porcentaje, Some(d("90")));
        assert_eq!(r.meses[1].porcentaje, Some(d("110")));
        assert_eq!(r.meses[2], ComplianceCell { real: None, objetivo: None, porcentaje: None });
        assert_eq!(r.anual.real, Some(d("200")));
        assert_eq!(r.anual.objetivo, Some(d("200")));
        assert_eq!(r.anual.porcentaje, Some(d("100")));
    }

    #[test]
    fn variables_without_targets_are_appended() {
        let reales = vec![row(2, "Zeta", 1, Some("5")), row(3, "Alfa", 1, Some("5"))];
        let objetivos = vec![row(1, "Meta", 1, Some("10"))];
        let rows = build(reales, objetivos);
        let ids: Vec<i32> = rows.iter().map(|r| r.id_variable).collect();
        assert_eq!(ids, vec![1, 3, 2]);
        assert_eq!(rows[0].anual.real, None);
        assert_eq!(rows[0].anual.porcentaje, None);
        assert_eq!(rows[1].anual.objetivo, None);
    }
}
