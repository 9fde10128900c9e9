// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! # LP Model Dump
//!
//! Renders the full mixed-integer program of a `Model` in CPLEX-LP text so
//! that an instance can be inspected or fed to an external solver
//! for cross-checking. Writing only; nothing in the crate reads this format.
//!
//! Variables:
//! - `open_<facility>`: binary activation.
//! - `trans_<demand point>_<facility>`: non-negative flow.
//!
//! Rows:
//! - `Capacity_<facility>`: `Σ trans - capacity · open <= 0`
//! - `Demand_<demand point>`: `Σ trans = demand`
//!
//! Identifiers are sanitised: every character outside `[A-Za-z0-9_.]` becomes `_`.

use crate::{index::DemandIndex, model::Model};
use std::io::{self, Write};

/// Terms per output line; keeps lines well below the 510 character limit of the format.
const TERMS_PER_LINE: usize = 6;

/// Maps an arbitrary identifier onto characters legal in an LP name.
pub fn sanitize_identifier(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}

#[inline]
fn open_var(model: &Model, f: usize) -> String {
    format!("open_{}", sanitize_identifier(&model.facility_ids()[f]))
}

#[inline]
fn trans_var(model: &Model, f: usize, d: usize) -> String {
    format!(
        "trans_{}_{}",
        sanitize_identifier(&model.demand_point_ids()[d]),
        sanitize_identifier(&model.facility_ids()[f])
    )
}

/// Writes a linear expression, wrapping every `TERMS_PER_LINE` terms.
fn write_terms<W, I>(out: &mut W, terms: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = (f64, String)>,
{
    let mut written = 0usize;
    for (coefficient, name) in terms {
        if written > 0 && written % TERMS_PER_LINE == 0 {
            write!(out, "\n ")?;
        }
        let sign = if coefficient < 0.0 { '-' } else { '+' };
        let magnitude = coefficient.abs();
        match (written, sign) {
            (0, '+') => {}
            (0, _) => write!(out, "- ")?,
            _ => write!(out, " {} ", sign)?,
        }
        if magnitude == 1.0 {
            write!(out, "{}", name)?;
        } else {
            write!(out, "{} {}", magnitude, name)?;
        }
        written += 1;
    }
    if written == 0 {
        write!(out, "0")?;
    }
    Ok(())
}

/// Writes `model` as a CPLEX-LP minimisation problem to `out`.
///
/// # Errors
///
/// Propagates any I/O error of the writer.
///
/// # Examples
///
/// ```rust
/// # use siting_model::{entity::{Facility, DemandPoint}, model::Model, lp_format::write_lp};
/// let model = Model::new(
///     vec![Facility::new("A", 20.0, 10.0)],
///     vec![DemandPoint::new("D", 15.0)],
///     vec![vec![2.0]],
/// ).unwrap();
/// let mut buf = Vec::new();
/// write_lp(&model, &mut buf).unwrap();
/// let text = String::from_utf8(buf).unwrap();
/// assert!(text.contains("Demand_D: trans_D_A = 15"));
/// ```
pub fn write_lp<W>(model: &Model, mut out: W) -> io::Result<()>
where
    W: Write,
{
    let nf = model.num_facilities();
    let nd = model.num_demand_points();

    writeln!(
        out,
        "\\ facility location: {} facilities, {} demand points",
        nf, nd
    )?;
    writeln!(out, "Minimize")?;
    write!(out, " obj: ")?;
    let objective = (0..nf)
        .map(|f| (model.fixed_costs()[f], open_var(model, f)))
        .chain((0..nd).flat_map(|d| {
            let row = model.unit_cost_row(DemandIndex::new(d));
            (0..nf).map(move |f| (row[f], trans_var(model, f, d)))
        }))
        .filter(|(c, _)| *c != 0.0);
    write_terms(&mut out, objective)?;
    writeln!(out)?;

    writeln!(out, "Subject To")?;
    for f in 0..nf {
        write!(
            out,
            " Capacity_{}: ",
            sanitize_identifier(&model.facility_ids()[f])
        )?;
        let terms = (0..nd)
            .map(|d| (1.0, trans_var(model, f, d)))
            .chain(std::iter::once((-model.capacities()[f], open_var(model, f))));
        write_terms(&mut out, terms)?;
        writeln!(out, " <= 0")?;
    }
    for d in 0..nd {
        write!(
            out,
            " Demand_{}: ",
            sanitize_identifier(&model.demand_point_ids()[d])
        )?;
        write_terms(&mut out, (0..nf).map(|f| (1.0, trans_var(model, f, d))))?;
        writeln!(out, " = {}", model.demands()[d])?;
    }

    writeln!(out, "Binaries")?;
    for f in 0..nf {
        writeln!(out, " {}", open_var(model, f))?;
    }
    writeln!(out, "End")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{DemandPoint, Facility};

    fn render(model: &Model) -> String {
        let mut buf = Vec::new();
        write_lp(model, &mut buf).expect("writing to a Vec cannot fail");
        String::from_utf8(buf).expect("LP output is ASCII")
    }

    #[test]
    fn test_sanitize_identifier() {
        assert_eq!(sanitize_identifier("Plant 1"), "Plant_1");
        assert_eq!(sanitize_identifier("a-b+c"), "a_b_c");
        assert_eq!(sanitize_identifier("x.y_z"), "x.y_z");
        assert_eq!(sanitize_identifier(""), "_");
    }

    #[test]
    fn test_write_lp_sections() {
        let model = Model::new(
            vec![Facility::new("A", 20.0, 10.0), Facility::new("B", 5.0, 0.0)],
            vec![DemandPoint::new("D", 15.0)],
            vec![vec![2.0, -1.0]],
        )
        .expect("valid model");
        let text = render(&model);

        assert!(text.starts_with("\\ facility location: 2 facilities, 1 demand points\n"));
        assert!(text.contains("Minimize\n obj: 10 open_A + 2 trans_D_A - trans_D_B\n"));
        assert!(text.contains(" Capacity_A: trans_D_A - 20 open_A <= 0\n"));
        assert!(text.contains(" Capacity_B: trans_D_B - 5 open_B <= 0\n"));
        assert!(text.contains(" Demand_D: trans_D_A + trans_D_B = 15\n"));
        assert!(text.contains("Binaries\n open_A\n open_B\nEnd\n"));
    }

    #[test]
    fn test_write_lp_wraps_long_rows() {
        let facilities: Vec<Facility> = (0..10)
            .map(|i| Facility::new(format!("F{}", i), 1.0, 1.0))
            .collect();
        let model = Model::new(facilities, vec![DemandPoint::new("D", 1.0)], vec![vec![1.0; 10]])
            .expect("valid model");
        let text = render(&model);
        let demand_row: Vec<&str> = text
            .lines()
            .skip_while(|l| !l.starts_with(" Demand_D"))
            .take(2)
            .collect();
        assert!(demand_row[1].starts_with("  + trans_D_F6"));
    }
}
