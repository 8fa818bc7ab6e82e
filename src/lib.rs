/*!
# PAP delivery tracker

A browser-based tool that checks Pap smear samples against their 28-day
delivery deadline, built in Rust.

## Overview

A health network exports its sample log as a `;`-separated CSV (Latin-1) or
as a workbook. Each row has a collection date (`Fecha_Toma_PAP`) and, once
the result is back, a delivery date (`Fecha_Entrega_PAP`). The tool shows how
many days each pending sample has left, colours the urgent ones, lets the user
filter by `Micro_Red` and fix rows by hand, and charts delivered vs. pending
samples per `Micro_Red`.

## Architecture

Every interaction reruns the whole pipeline from the uploaded bytes:

1. **loader** - reads the CSV or the first sheet, trims column names, keeps
   `DNI` as text
2. **schema** - checks the two date columns and parses them day-first
3. **deadline** - `28 - days since collection` for samples not yet delivered,
   then sorts most urgent first
4. **presenter** - red / yellow / green tiers for display
5. **filter** - keeps the chosen `Micro_Red` values
6. **editor** - applies the grid edits to a copy of the filtered rows
7. **aggregate** / **graph** - per-`Micro_Red` counts and the grouped bar chart

[`pipeline::process`] strings these together as one pure function of the
upload, the date, the filter selection and the edits. The web host (`app`)
keeps no state; the page sends the whole session with every request.

## Modules

- **cell**: typed cell values
- **dates**: day-first date parsing
- **record**: records, datasets and column names
- **error**: user-facing error type
- **downloader**: export of the edited table (CSV, XLSX)
- **app**: routes of the web host
*/

pub mod aggregate;
pub mod app;
pub mod cell;
pub mod dates;
pub mod deadline;
pub mod downloader;
pub mod editor;
pub mod error;
pub mod filter;
pub mod graph;
pub mod loader;
pub mod pipeline;
pub mod presenter;
pub mod record;
pub mod schema;

pub use error::PapError;
pub use pipeline::{RunOutcome, RunRequest, process};
