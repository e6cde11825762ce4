//! Command handlers for the interactive shell.

use std::path::Path;

use dialoguer::Confirm;

use crate::cli::context::{CliMode, CommandError, CommandOutcome, LoopControl, ShellContext};
use crate::cli::output;
use crate::cli::registry::{CommandEntry, CommandRegistry};
use crate::importer;
use crate::model::{
    month_index, selection_key, CategoryId, Row, RowId, Totals, Transaction, MONTH_NAMES,
};

pub fn register_all(registry: &mut CommandRegistry) {
    registry.register(CommandEntry::new(
        "help",
        "List available commands",
        "help",
        cmd_help,
    ));
    registry.register(CommandEntry::new(
        "show",
        "Show totals, the plan, and the selected month",
        "show",
        cmd_show,
    ));
    registry.register(CommandEntry::new(
        "summary",
        "Show monthly, quarterly, biannual, and annual totals",
        "summary",
        cmd_summary,
    ));
    registry.register(CommandEntry::new(
        "budget",
        "Set the global budget figure",
        "budget <amount>",
        cmd_budget,
    ));
    registry.register(CommandEntry::new(
        "month",
        "Select the working month",
        "month <name|1-12>",
        cmd_month,
    ));
    registry.register(CommandEntry::new(
        "category",
        "Add or remove a category",
        "category add <name> | category rm <name>",
        cmd_category,
    ));
    registry.register(CommandEntry::new(
        "row",
        "Add or remove a row inside a category",
        "row add <category> <name> [planned] | row rm <category> <name>",
        cmd_row,
    ));
    registry.register(CommandEntry::new(
        "plan",
        "Set a row's planned amount",
        "plan <category> <row> <amount>",
        cmd_plan,
    ));
    registry.register(CommandEntry::new(
        "tx",
        "Manage the selected month's transactions",
        "tx add [<date> <amount> [description]] | tx rm <n> | tx assign <n> <category> <row> | tx clear",
        cmd_tx,
    ));
    registry.register(CommandEntry::new(
        "mute",
        "Toggle a mute flag",
        "mute row <category> <name> | mute tx <n> | mute month",
        cmd_mute,
    ));
    registry.register(CommandEntry::new(
        "swap",
        "Reorder categories, rows, or transactions",
        "swap category <a> <b> | swap row <category> <a> <b> | swap tx <a> <b>",
        cmd_swap,
    ));
    registry.register(CommandEntry::new(
        "import",
        "Import a CSV file into the selected month",
        "import <file.csv>",
        cmd_import,
    ));
    registry.register(CommandEntry::new(
        "save",
        "Save the budget to disk",
        "save",
        cmd_save,
    ));
    registry.register(CommandEntry::new(
        "load",
        "Reload the budget from disk",
        "load",
        cmd_load,
    ));
    registry.register(CommandEntry::new(
        "backup",
        "Snapshot the budget into the backups directory",
        "backup [note]",
        cmd_backup,
    ));
    registry.register(CommandEntry::new(
        "backups",
        "List available backups",
        "backups",
        cmd_backups,
    ));
    registry.register(CommandEntry::new(
        "restore",
        "Replace the working budget with a backup",
        "restore <backup-name>",
        cmd_restore,
    ));
    registry.register(CommandEntry::new(
        "quit",
        "Save if needed and exit",
        "quit",
        cmd_quit,
    ));
    registry.register(CommandEntry::new("exit", "Alias for quit", "exit", cmd_quit));
}

// -- lookups -------------------------------------------------------------

fn require_category(context: &ShellContext, name: &str) -> Result<CategoryId, CommandError> {
    context
        .book
        .find_category(name)
        .ok_or_else(|| CommandError::Input(format!("No category named `{}`.", name)))
}

fn require_row(
    context: &ShellContext,
    category_id: CategoryId,
    category: &str,
    name: &str,
) -> Result<RowId, CommandError> {
    context
        .book
        .find_row(category_id, name)
        .ok_or_else(|| CommandError::Input(format!("No row `{}` under `{}`.", name, category)))
}

/// Resolves a 1-based display index into the selected month's transactions.
fn require_tx_position(context: &ShellContext, arg: &str) -> Result<usize, CommandError> {
    let position: usize = arg
        .parse()
        .map_err(|_| CommandError::Input(format!("`{}` is not a transaction number.", arg)))?;
    let count = context.book.months[context.book.selected_tab].transactions.len();
    if position == 0 || position > count {
        return Err(CommandError::Input(format!(
            "Transaction number {} is out of range (1-{}).",
            position, count
        )));
    }
    Ok(position - 1)
}

fn confirm(context: &ShellContext, prompt: &str) -> Result<bool, CommandError> {
    if context.mode == CliMode::Script {
        return Ok(true);
    }
    Ok(Confirm::with_theme(&context.theme)
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}

fn selected_month_name(context: &ShellContext) -> &'static str {
    MONTH_NAMES[context.book.selected_tab]
}

// -- handlers ------------------------------------------------------------

fn cmd_help(context: &mut ShellContext, _args: &[&str]) -> CommandOutcome {
    output::section("Commands");
    for entry in context.registry.list() {
        output::info(format!("{:<10} {}", entry.name, entry.description));
        output::info(format!("{:<10} usage: {}", "", entry.usage));
    }
    Ok(LoopControl::Continue)
}

fn cmd_show(context: &mut ShellContext, _args: &[&str]) -> CommandOutcome {
    context.recompute();
    let totals = context.report.months[context.book.selected_tab];

    output::section("Totals");
    output::info(format!("Budget:  {:>10}", context.book.budget.text()));
    print_totals_lines(&totals);

    output::section("Plan");
    for category_id in context.book.category_ids().collect::<Vec<_>>() {
        let Some(category) = context.book.category(category_id) else {
            continue;
        };
        let muted = category.muted(context.book.row_pool());
        output::info(format!(
            "{:>3} {:<24} {} {} {}{}",
            category.row_count(),
            category.name(),
            output::money(category.planned, 9),
            output::money(category.spent, 9),
            output::money(category.diff, 9),
            muted_marker(muted),
        ));
        for row_id in &category.rows {
            let Some(row) = context.book.row(*row_id) else {
                continue;
            };
            output::info(format!(
                "    {:<24} {:>9} {} {}{}",
                row.name(),
                row.planned.text(),
                output::money(row.spent, 9),
                output::money(row.diff, 9),
                muted_marker(row.muted),
            ));
        }
    }

    output::section(selected_month_name(context));
    let month = &context.book.months[context.book.selected_tab];
    if month.muted {
        output::info("(month muted)");
    }
    for (index, transaction_id) in month.transactions.iter().enumerate() {
        let Some(transaction) = context.book.transaction(*transaction_id) else {
            continue;
        };
        output::info(format!(
            "{:>3}  {:<12} {:>10}  {:<28} {}{}",
            index + 1,
            transaction.date,
            transaction.amount.text(),
            transaction.description,
            transaction.selection,
            muted_marker(transaction.muted),
        ));
    }
    Ok(LoopControl::Continue)
}

fn print_totals_lines(totals: &Totals) {
    output::info(format!("Planned: {}", output::money(totals.planned, 10)));
    output::info(format!("Actual:  {}", output::money(totals.spent, 10)));
    output::info(format!("Diff:    {}", output::money(totals.diff, 10)));
    output::info(format!("Goal:    {}", output::money(totals.goal, 10)));
    output::info(format!("Saved:   {}", output::money(totals.saved, 10)));
}

fn muted_marker(muted: bool) -> &'static str {
    if muted {
        " [muted]"
    } else {
        ""
    }
}

fn cmd_summary(context: &mut ShellContext, _args: &[&str]) -> CommandOutcome {
    context.recompute();
    let report = context.report;

    output::section("Months");
    print_scope_header();
    for (index, totals) in report.months.iter().enumerate() {
        print_scope_line(MONTH_NAMES[index], totals);
    }
    output::section("Quarters");
    print_scope_header();
    for (index, totals) in report.quarters.iter().enumerate() {
        print_scope_line(&format!("Q{}", index + 1), totals);
    }
    output::section("Halves");
    print_scope_header();
    for (index, totals) in report.halves.iter().enumerate() {
        print_scope_line(&format!("H{}", index + 1), totals);
    }
    output::section("Year");
    print_scope_header();
    print_scope_line("Annual", &report.year);
    Ok(LoopControl::Continue)
}

fn print_scope_header() {
    output::info(format!(
        "{:<10} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "", "Planned", "Actual", "Diff", "Saved", "Goal"
    ));
}

fn print_scope_line(label: &str, totals: &Totals) {
    output::info(format!(
        "{:<10} {} {} {} {} {}",
        label,
        output::money(totals.planned, 10),
        output::money(totals.spent, 10),
        output::money(totals.diff, 10),
        output::money(totals.saved, 10),
        output::money(totals.goal, 10),
    ));
}

fn cmd_budget(context: &mut ShellContext, args: &[&str]) -> CommandOutcome {
    if args.is_empty() {
        return Err(CommandError::input("Usage: budget <amount>"));
    }
    context.book.budget.set_text(args.join(" "));
    context.mark_dirty();
    output::success(format!("Budget set to {}.", context.book.budget.text()));
    Ok(LoopControl::Continue)
}

fn cmd_month(context: &mut ShellContext, args: &[&str]) -> CommandOutcome {
    let [name] = args else {
        return Err(CommandError::input("Usage: month <name|1-12>"));
    };
    let index = month_index(name)
        .ok_or_else(|| CommandError::Input(format!("`{}` is not a month.", name)))?;
    context.book.selected_tab = index;
    context.mark_dirty();
    output::success(format!("Selected {}.", selected_month_name(context)));
    Ok(LoopControl::Continue)
}

fn cmd_category(context: &mut ShellContext, args: &[&str]) -> CommandOutcome {
    match args {
        ["add", rest @ ..] if !rest.is_empty() => {
            let name = rest.join(" ");
            context.book.add_category(&name)?;
            context.mark_dirty();
            output::success(format!("Category `{}` added.", name));
        }
        ["rm", rest @ ..] if !rest.is_empty() => {
            let name = rest.join(" ");
            let id = require_category(context, &name)?;
            if !confirm(context, &format!("Remove category `{}` and its rows?", name))? {
                return Ok(LoopControl::Continue);
            }
            context.book.remove_category(id)?;
            context.mark_dirty();
            output::success(format!("Category `{}` removed.", name));
        }
        _ => return Err(CommandError::input("Usage: category add <name> | category rm <name>")),
    }
    Ok(LoopControl::Continue)
}

fn cmd_row(context: &mut ShellContext, args: &[&str]) -> CommandOutcome {
    match args {
        ["add", category, name, planned @ ..] => {
            let category_id = require_category(context, category)?;
            let mut row = Row::new(*name);
            if !planned.is_empty() {
                row.planned.set_text(planned.join(" "));
            }
            context.book.add_row(category_id, row)?;
            context.mark_dirty();
            output::success(format!("Row `{}` added to `{}`.", name, category));
        }
        ["rm", category, name] => {
            let category_id = require_category(context, category)?;
            let row_id = require_row(context, category_id, category, name)?;
            if !confirm(context, &format!("Remove row `{}`?", name))? {
                return Ok(LoopControl::Continue);
            }
            context.book.remove_row(category_id, row_id)?;
            context.mark_dirty();
            output::success(format!("Row `{}` removed from `{}`.", name, category));
        }
        _ => {
            return Err(CommandError::input(
                "Usage: row add <category> <name> [planned] | row rm <category> <name>",
            ))
        }
    }
    Ok(LoopControl::Continue)
}

fn cmd_plan(context: &mut ShellContext, args: &[&str]) -> CommandOutcome {
    let [category, name, amount] = args else {
        return Err(CommandError::input("Usage: plan <category> <row> <amount>"));
    };
    let category_id = require_category(context, category)?;
    let row_id = require_row(context, category_id, category, name)?;
    if let Some(row) = context.book.row_mut(row_id) {
        row.planned.set_text(*amount);
    }
    context.mark_dirty();
    output::success(format!("Planned `{}` for {}: {}.", amount, category, name));
    Ok(LoopControl::Continue)
}

fn cmd_tx(context: &mut ShellContext, args: &[&str]) -> CommandOutcome {
    let month = context.book.selected_tab;
    match args {
        ["add"] => {
            // Copy the previous entry's date, or start the month on the
            // placeholder date.
            let date = context.book.months[month]
                .transactions
                .last()
                .and_then(|id| context.book.transaction(*id))
                .map(|tx| tx.date.clone())
                .unwrap_or_else(|| "01/01/2024".to_string());
            let position = context.book.months[month].transactions.len() + 1;
            context
                .book
                .add_transaction(month, Transaction::new(date, "0", ""))?;
            context.mark_dirty();
            output::success(format!(
                "Transaction {} added to {}.",
                position,
                selected_month_name(context)
            ));
        }
        ["add", date, amount, description @ ..] => {
            let position = context.book.months[month].transactions.len() + 1;
            context.book.add_transaction(
                month,
                Transaction::new(*date, *amount, description.join(" ")),
            )?;
            context.mark_dirty();
            output::success(format!(
                "Transaction {} added to {}.",
                position,
                selected_month_name(context)
            ));
        }
        ["rm", number] => {
            let position = require_tx_position(context, number)?;
            let id = context.book.months[month].transactions[position];
            context.book.remove_transaction(month, id)?;
            context.mark_dirty();
            output::success(format!("Transaction {} removed.", position + 1));
        }
        ["assign", number, category, name] => {
            let position = require_tx_position(context, number)?;
            let selection = selection_key(category, name);
            let options = context.book.selection_options();
            if !options.contains(&selection) {
                let assignable: Vec<&str> =
                    options.iter().skip(1).map(String::as_str).collect();
                return Err(CommandError::Input(if assignable.is_empty() {
                    format!("`{}` is not assignable; no rows exist yet.", selection)
                } else {
                    format!(
                        "`{}` is not assignable. Assignable rows: {}.",
                        selection,
                        assignable.join(", ")
                    )
                }));
            }
            let id = context.book.months[month].transactions[position];
            if let Some(transaction) = context.book.transaction_mut(id) {
                transaction.selection = selection_key(category, name);
            }
            context.mark_dirty();
            output::success(format!(
                "Transaction {} assigned to `{}`.",
                position + 1,
                selection_key(category, name)
            ));
        }
        ["clear"] => {
            if !confirm(
                context,
                &format!("Remove all transactions in {}?", selected_month_name(context)),
            )? {
                return Ok(LoopControl::Continue);
            }
            context.book.clear_month(month)?;
            context.mark_dirty();
            output::success(format!("{} cleared.", selected_month_name(context)));
        }
        _ => {
            return Err(CommandError::input(
                "Usage: tx add [<date> <amount> [description]] | tx rm <n> | tx assign <n> <category> <row> | tx clear",
            ))
        }
    }
    Ok(LoopControl::Continue)
}

fn cmd_mute(context: &mut ShellContext, args: &[&str]) -> CommandOutcome {
    match args {
        ["row", category, name] => {
            let category_id = require_category(context, category)?;
            let row_id = require_row(context, category_id, category, name)?;
            let muted = {
                let row = context
                    .book
                    .row_mut(row_id)
                    .ok_or_else(|| CommandError::input("Row vanished."))?;
                row.muted = !row.muted;
                row.muted
            };
            context.mark_dirty();
            output::success(format!(
                "Row `{}` {}.",
                name,
                if muted { "muted" } else { "unmuted" }
            ));
        }
        ["tx", number] => {
            let position = require_tx_position(context, number)?;
            let id = context.book.months[context.book.selected_tab].transactions[position];
            let muted = {
                let transaction = context
                    .book
                    .transaction_mut(id)
                    .ok_or_else(|| CommandError::input("Transaction vanished."))?;
                transaction.muted = !transaction.muted;
                transaction.muted
            };
            context.mark_dirty();
            output::success(format!(
                "Transaction {} {}.",
                position + 1,
                if muted { "muted" } else { "unmuted" }
            ));
        }
        ["month"] => {
            let month = context.book.selected_tab;
            context.book.months[month].muted = !context.book.months[month].muted;
            let muted = context.book.months[month].muted;
            context.mark_dirty();
            output::success(format!(
                "{} {}.",
                selected_month_name(context),
                if muted { "muted" } else { "unmuted" }
            ));
        }
        _ => {
            return Err(CommandError::input(
                "Usage: mute row <category> <name> | mute tx <n> | mute month",
            ))
        }
    }
    Ok(LoopControl::Continue)
}

/// Parses a 1-based display position.
fn require_position(arg: &str) -> Result<usize, CommandError> {
    arg.parse::<usize>()
        .ok()
        .filter(|position| *position > 0)
        .map(|position| position - 1)
        .ok_or_else(|| CommandError::Input(format!("`{}` is not a position.", arg)))
}

fn cmd_swap(context: &mut ShellContext, args: &[&str]) -> CommandOutcome {
    match args {
        ["category", a, b] => {
            let (a, b) = (require_position(a)?, require_position(b)?);
            context.book.swap_categories(a, b)?;
            context.mark_dirty();
            output::success(format!("Categories {} and {} swapped.", a + 1, b + 1));
        }
        ["row", category, a, b] => {
            let category_id = require_category(context, category)?;
            let (a, b) = (require_position(a)?, require_position(b)?);
            context.book.swap_rows(category_id, a, b)?;
            context.mark_dirty();
            output::success(format!(
                "Rows {} and {} swapped in `{}`.",
                a + 1,
                b + 1,
                category
            ));
        }
        ["tx", a, b] => {
            let month = context.book.selected_tab;
            let (a, b) = (require_position(a)?, require_position(b)?);
            context.book.swap_transactions(month, a, b)?;
            context.mark_dirty();
            output::success(format!("Transactions {} and {} swapped.", a + 1, b + 1));
        }
        _ => {
            return Err(CommandError::input(
                "Usage: swap category <a> <b> | swap row <category> <a> <b> | swap tx <a> <b>",
            ))
        }
    }
    Ok(LoopControl::Continue)
}

fn cmd_import(context: &mut ShellContext, args: &[&str]) -> CommandOutcome {
    let [path] = args else {
        return Err(CommandError::input("Usage: import <file.csv>"));
    };
    let month = context.book.selected_tab;
    let summary = importer::import_csv(
        &mut context.book,
        month,
        Path::new(path),
        &context.import_config,
    )?;
    context.mark_dirty();
    output::success(format!(
        "Imported {} transactions ({} skipped) into {}.",
        summary.imported,
        summary.skipped,
        selected_month_name(context)
    ));
    Ok(LoopControl::Continue)
}

fn cmd_save(context: &mut ShellContext, _args: &[&str]) -> CommandOutcome {
    let path = context.store.save(&context.book)?;
    context.dirty = false;
    output::success(format!("Budget saved to {}.", path.display()));
    Ok(LoopControl::Continue)
}

fn cmd_load(context: &mut ShellContext, _args: &[&str]) -> CommandOutcome {
    if context.dirty && !confirm(context, "Discard unsaved changes and reload?")? {
        return Ok(LoopControl::Continue);
    }
    match context.store.load()? {
        Some(book) => {
            context.book = book;
            context.dirty = false;
            context.recompute();
            output::success("Budget reloaded from disk.");
        }
        None => output::warning("No saved budget on disk yet."),
    }
    Ok(LoopControl::Continue)
}

fn cmd_backup(context: &mut ShellContext, args: &[&str]) -> CommandOutcome {
    let note = if args.is_empty() {
        None
    } else {
        Some(args.join(" "))
    };
    let name = context.store.backup(&context.book, note.as_deref())?;
    output::success(format!("Backup `{}` created.", name));
    Ok(LoopControl::Continue)
}

fn cmd_backups(context: &mut ShellContext, _args: &[&str]) -> CommandOutcome {
    let names = context.store.list_backups()?;
    if names.is_empty() {
        output::info("No backups yet.");
    } else {
        output::section("Backups");
        for name in names {
            output::info(name);
        }
    }
    Ok(LoopControl::Continue)
}

fn cmd_restore(context: &mut ShellContext, args: &[&str]) -> CommandOutcome {
    let [name] = args else {
        return Err(CommandError::input("Usage: restore <backup-name>"));
    };
    if !confirm(
        context,
        &format!("Replace the working budget with `{}`?", name),
    )? {
        return Ok(LoopControl::Continue);
    }
    context.book = context.store.restore_backup(name)?;
    context.mark_dirty();
    output::success(format!("Budget restored from `{}`.", name));
    Ok(LoopControl::Continue)
}

fn cmd_quit(context: &mut ShellContext, _args: &[&str]) -> CommandOutcome {
    if context.dirty {
        let path = context.store.save(&context.book)?;
        context.dirty = false;
        output::success(format!("Budget saved to {}.", path.display()));
    }
    context.running = false;
    Ok(LoopControl::Exit)
}
