use assert_cmd::Command;
use predicates::str::contains;
use tempfile::tempdir;

fn budgeteer_cmd(home: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("budgeteer").unwrap();
    cmd.env("BUDGETEER_CLI_SCRIPT", "1")
        .env("BUDGETEER_HOME", home);
    cmd
}

#[test]
fn script_mode_runs_basic_flow() {
    let home = tempdir().unwrap();
    let input = "budget 1500\n\
                 category add Food\n\
                 row add Food Groceries 250\n\
                 tx add 01/05/2024 42.50 \"weekly shop\"\n\
                 tx assign 1 Food Groceries\n\
                 show\n\
                 quit\n";

    budgeteer_cmd(home.path())
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Category `Food` added."))
        .stdout(contains("Row `Groceries` added to `Food`."))
        .stdout(contains("Transaction 1 added to January."))
        .stdout(contains("42.50"));

    let saved = std::fs::read_to_string(home.path().join("budget.b")).unwrap();
    assert!(saved.contains("#budget"));
    assert!(saved.contains("name=Food\u{1B}"));
    assert!(saved.contains("selection=Food: Groceries\u{1B}"));
}

#[test]
fn unknown_commands_get_a_suggestion() {
    let home = tempdir().unwrap();
    budgeteer_cmd(home.path())
        .write_stdin("sho\nquit\n")
        .assert()
        .success()
        .stdout(contains("Did you mean `show`?"));
}

#[test]
fn swap_reorders_saved_categories() {
    let home = tempdir().unwrap();
    budgeteer_cmd(home.path())
        .write_stdin("category add Food\ncategory add Bills\nswap category 1 2\nquit\n")
        .assert()
        .success()
        .stdout(contains("Categories 1 and 2 swapped."));

    let saved = std::fs::read_to_string(home.path().join("budget.b")).unwrap();
    let bills = saved.find("name=Bills\u{1B}").unwrap();
    let food = saved.find("name=Food\u{1B}").unwrap();
    assert!(bills < food, "swapped order must persist");
}

#[test]
fn assigning_an_unknown_row_lists_the_options() {
    let home = tempdir().unwrap();
    budgeteer_cmd(home.path())
        .write_stdin(
            "category add Food\n\
             row add Food Groceries\n\
             tx add 01/05/2024 10 snack\n\
             tx assign 1 Food Snacks\n\
             quit\n",
        )
        .assert()
        .success()
        .stdout(contains("`Food: Snacks` is not assignable"))
        .stdout(contains("Assignable rows: Food: Groceries."));
}

#[test]
fn state_survives_separate_invocations() {
    let home = tempdir().unwrap();
    budgeteer_cmd(home.path())
        .write_stdin("category add Bills\nquit\n")
        .assert()
        .success();

    budgeteer_cmd(home.path())
        .write_stdin("show\nquit\n")
        .assert()
        .success()
        .stdout(contains("Bills"));
}
