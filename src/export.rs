use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::matchup::UnitEdges;
use crate::picks::{GamePick, WeekModel};
use crate::unit_metrics::OffenseUnit;

pub struct ExportReport {
    pub offense_rows: usize,
    pub defense_rows: usize,
    pub picks: usize,
}

enum Cell {
    Text(String),
    Num(Option<f64>),
}

fn text(s: impl Into<String>) -> Cell {
    Cell::Text(s.into())
}

fn header(names: &[&str]) -> Vec<Cell> {
    names.iter().map(|n| text(*n)).collect()
}

/// Write the scored unit tables and the week's picks to an XLSX workbook.
pub fn write_workbook(path: &Path, model: &WeekModel, picks: &[GamePick]) -> Result<ExportReport> {
    let mut offense_rows = vec![header(&[
        "Team",
        "Unit",
        "EPA/play",
        "Success rate",
        "Explosive rate",
        "Pass block win",
        "Run block win",
        "EPA n",
        "Success n",
        "Explosive n",
        "Pass block n",
        "Run block n",
        "Unit score",
    ])];
    for row in &model.offense {
        let m = &row.metric;
        let n = &row.normalized;
        offense_rows.push(vec![
            text(&m.team),
            text(m.unit.label()),
            Cell::Num(m.epa_per_play),
            Cell::Num(m.success_rate),
            Cell::Num(m.explosive_rate),
            Cell::Num(m.pass_block_win),
            Cell::Num(m.run_block_win),
            Cell::Num(n.epa),
            Cell::Num(n.success),
            Cell::Num(n.explosive),
            Cell::Num(n.pass_block_win),
            Cell::Num(n.run_block_win),
            Cell::Num(row.score),
        ]);
    }

    let mut defense_rows = vec![header(&[
        "Team",
        "Unit",
        "EPA allowed",
        "Success allowed",
        "Explosive allowed",
        "Pressure rate",
        "Run stop win",
        "Coverage grade",
        "EPA allowed n",
        "Success allowed n",
        "Explosive allowed n",
        "Pressure n",
        "Run stop n",
        "Coverage n",
        "Unit score",
    ])];
    for row in &model.defense {
        let m = &row.metric;
        let n = &row.normalized;
        defense_rows.push(vec![
            text(&m.team),
            text(m.unit.label()),
            Cell::Num(m.epa_allowed),
            Cell::Num(m.success_allowed),
            Cell::Num(m.explosive_allowed),
            Cell::Num(m.pressure_rate),
            Cell::Num(m.run_stop_win),
            Cell::Num(m.coverage_grade),
            Cell::Num(n.epa_allowed),
            Cell::Num(n.success_allowed),
            Cell::Num(n.explosive_allowed),
            Cell::Num(n.pressure),
            Cell::Num(n.run_stop_win),
            Cell::Num(n.coverage),
            Cell::Num(row.score),
        ]);
    }

    let mut pick_header = vec![text("Game"), text("Gameday"), text("Home"), text("Away")];
    for side in ["Home", "Away"] {
        for unit in OffenseUnit::ALL {
            pick_header.push(text(format!("{side} {} raw", unit.label())));
            pick_header.push(text(format!("{side} {} adj", unit.label())));
        }
        pick_header.push(text(format!("{side} TTF")));
        pick_header.push(text(format!("{side} edge")));
    }
    pick_header.extend([text("Net edge"), text("Verdict")]);

    let mut pick_rows = vec![pick_header];
    for pick in picks {
        let mut row = vec![
            text(&pick.label),
            text(&pick.gameday),
            text(&pick.home_team),
            text(&pick.away_team),
        ];
        for side in [&pick.home, &pick.away] {
            push_edges(&mut row, &side.raw, &side.adjusted);
            row.push(Cell::Num(Some(side.ttf)));
            row.push(Cell::Num(side.edge));
        }
        row.push(Cell::Num(pick.net_edge));
        row.push(text(&pick.headline));
        pick_rows.push(row);
    }

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Offense Units")?;
        write_rows(sheet, &offense_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Defense Units")?;
        write_rows(sheet, &defense_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Picks")?;
        write_rows(sheet, &pick_rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        offense_rows: offense_rows.len().saturating_sub(1),
        defense_rows: defense_rows.len().saturating_sub(1),
        picks: pick_rows.len().saturating_sub(1),
    })
}

fn push_edges(row: &mut Vec<Cell>, raw: &UnitEdges, adjusted: &UnitEdges) {
    for unit in OffenseUnit::ALL {
        row.push(Cell::Num(raw.get(unit)));
        row.push(Cell::Num(adjusted.get(unit)));
    }
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<Cell>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            let (r, c) = (row_idx as u32, col_idx as u16);
            match cell {
                Cell::Text(s) => {
                    worksheet.write_string(r, c, s)?;
                }
                Cell::Num(Some(v)) if v.is_finite() => {
                    worksheet.write_number(r, c, *v)?;
                }
                Cell::Num(_) => {}
            }
        }
    }
    Ok(())
}
