//! Numbered console menu over an `Inventory`.
//!
//! Input and output are injected so the loop can be driven by scripted
//! input in tests. Inventory errors are printed and the loop continues; only
//! I/O failures on the console itself end it early.

use anyhow::Context;
use inventory_core::{demo_items, Inventory, InventoryError, Item, ItemId, ItemRepository};
use log::info;
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

const MENU: &str = "
=== INVENTORY ===
1. Add item
2. Delete item by id
3. Update item quantity
4. Update item price
5. Search items by name
6. List all items
7. Load demo data
8. Inventory report
9. Export to JSON
0. Exit";

enum Flow {
    Continue,
    Exit,
}

struct Console<I, W> {
    input: I,
    out: W,
}

impl<I: BufRead, W: Write> Console<I, W> {
    /// Prompts and reads one trimmed line; `None` on end of input.
    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.out, "{prompt}")?;
        self.out.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Re-prompts until the answer parses as `T`; `None` on end of input.
    fn ask_parsed<T: FromStr>(&mut self, prompt: &str, hint: &str) -> io::Result<Option<T>> {
        loop {
            let Some(answer) = self.ask(prompt)? else {
                return Ok(None);
            };
            match answer.parse() {
                Ok(value) => return Ok(Some(value)),
                Err(_) => writeln!(self.out, "Invalid input. {hint}")?,
            }
        }
    }

    fn ask_id(&mut self, prompt: &str) -> io::Result<Option<ItemId>> {
        self.ask_parsed(prompt, "Enter a whole number.")
    }

    fn ask_price(&mut self, prompt: &str) -> io::Result<Option<f64>> {
        self.ask_parsed(prompt, "Enter a number (use a decimal point).")
    }

    fn say(&mut self, message: impl std::fmt::Display) -> io::Result<()> {
        writeln!(self.out, "{message}")
    }
}

/// Runs the menu until the user exits or input ends.
pub fn run<R, I, W>(inventory: &mut Inventory<R>, input: I, out: W) -> io::Result<()>
where
    R: ItemRepository,
    I: BufRead,
    W: Write,
{
    let mut console = Console { input, out };
    info!("event=menu_start module=cli status=ok");

    loop {
        console.say(MENU)?;
        let Some(choice) = console.ask("Choose an option: ")? else {
            console.say("Exiting...")?;
            break;
        };

        match dispatch(inventory, &mut console, &choice)? {
            Flow::Continue => {}
            Flow::Exit => {
                console.say("Exiting...")?;
                break;
            }
        }
    }

    console.out.flush()?;
    info!("event=menu_exit module=cli status=ok");
    Ok(())
}

fn dispatch<R, I, W>(
    inventory: &mut Inventory<R>,
    console: &mut Console<I, W>,
    choice: &str,
) -> io::Result<Flow>
where
    R: ItemRepository,
    I: BufRead,
    W: Write,
{
    match choice {
        "1" => add_item(inventory, console),
        "2" => delete_item(inventory, console),
        "3" => update_quantity(inventory, console),
        "4" => update_price(inventory, console),
        "5" => search(inventory, console),
        "6" => {
            list_all(inventory, console)?;
            Ok(Flow::Continue)
        }
        "7" => {
            match inventory.seed(demo_items()) {
                Ok(added) => console.say(format!(
                    "Loaded {added} demo items (duplicates were skipped)."
                ))?,
                Err(err) => console.say(format!("Error: {err}"))?,
            }
            Ok(Flow::Continue)
        }
        "8" => {
            let summary = inventory.summary();
            console.say(format!(
                "Items: {} | Units: {} | Stock value: ${:.2}",
                summary.item_count, summary.total_units, summary.total_value
            ))?;
            Ok(Flow::Continue)
        }
        "9" => export(inventory, console),
        "0" => Ok(Flow::Exit),
        _ => {
            console.say("Invalid option.")?;
            Ok(Flow::Continue)
        }
    }
}

// Each handler returns `Flow::Exit` when input ends mid-prompt.

fn add_item<R: ItemRepository, I: BufRead, W: Write>(
    inventory: &mut Inventory<R>,
    console: &mut Console<I, W>,
) -> io::Result<Flow> {
    let Some(id) = console.ask_id("Id (unique whole number): ")? else {
        return Ok(Flow::Exit);
    };
    let Some(name) = console.ask("Name: ")? else {
        return Ok(Flow::Exit);
    };
    if inventory.contains_name(&name) {
        console.say(format!("Error: {}", InventoryError::DuplicateName(name)))?;
        return Ok(Flow::Continue);
    }
    let Some(quantity) = console.ask_parsed("Quantity: ", "Enter a whole number.")? else {
        return Ok(Flow::Exit);
    };
    let Some(price) = console.ask_price("Price: ")? else {
        return Ok(Flow::Exit);
    };

    match inventory.add(Item::new(id, name, quantity, price)) {
        Ok(()) => console.say("Item added.")?,
        Err(err) => console.say(format!("Error: {err}"))?,
    }
    Ok(Flow::Continue)
}

fn delete_item<R: ItemRepository, I: BufRead, W: Write>(
    inventory: &mut Inventory<R>,
    console: &mut Console<I, W>,
) -> io::Result<Flow> {
    let Some(id) = console.ask_id("Id to delete: ")? else {
        return Ok(Flow::Exit);
    };

    match inventory.remove(id) {
        Ok(true) => console.say("Item deleted.")?,
        Ok(false) => console.say(format!("No item with id {id}."))?,
        Err(err) => console.say(format!("Error: {err}"))?,
    }
    Ok(Flow::Continue)
}

fn update_quantity<R: ItemRepository, I: BufRead, W: Write>(
    inventory: &mut Inventory<R>,
    console: &mut Console<I, W>,
) -> io::Result<Flow> {
    let Some(id) = console.ask_id("Item id: ")? else {
        return Ok(Flow::Exit);
    };
    let Some(quantity) = console.ask_parsed("New quantity: ", "Enter a whole number.")? else {
        return Ok(Flow::Exit);
    };

    match inventory.update_quantity(id, quantity) {
        Ok(true) => console.say("Quantity updated.")?,
        Ok(false) => console.say(format!("No item with id {id}."))?,
        Err(err) => console.say(format!("Error: {err}"))?,
    }
    Ok(Flow::Continue)
}

fn update_price<R: ItemRepository, I: BufRead, W: Write>(
    inventory: &mut Inventory<R>,
    console: &mut Console<I, W>,
) -> io::Result<Flow> {
    let Some(id) = console.ask_id("Item id: ")? else {
        return Ok(Flow::Exit);
    };
    let Some(price) = console.ask_price("New price: ")? else {
        return Ok(Flow::Exit);
    };

    match inventory.update_price(id, price) {
        Ok(true) => console.say("Price updated.")?,
        Ok(false) => console.say(format!("No item with id {id}."))?,
        Err(err) => console.say(format!("Error: {err}"))?,
    }
    Ok(Flow::Continue)
}

fn search<R: ItemRepository, I: BufRead, W: Write>(
    inventory: &Inventory<R>,
    console: &mut Console<I, W>,
) -> io::Result<Flow> {
    let Some(term) = console.ask("Search by name (substring): ")? else {
        return Ok(Flow::Exit);
    };

    match inventory.find_by_name(&term) {
        Ok(found) if found.is_empty() => console.say("No matches.")?,
        Ok(found) => {
            console.say("\n-- Results --")?;
            for item in found {
                console.say(item)?;
            }
        }
        Err(err) => console.say(format!("Error: {err}"))?,
    }
    Ok(Flow::Continue)
}

fn list_all<R: ItemRepository, I: BufRead, W: Write>(
    inventory: &Inventory<R>,
    console: &mut Console<I, W>,
) -> io::Result<()> {
    let items = inventory.list_all();
    if items.is_empty() {
        return console.say("Inventory is empty.");
    }

    console.say("\n-- Inventory --")?;
    for item in items {
        console.say(item)?;
    }
    Ok(())
}

fn export<R: ItemRepository, I: BufRead, W: Write>(
    inventory: &Inventory<R>,
    console: &mut Console<I, W>,
) -> io::Result<Flow> {
    let Some(path) = console.ask("Export file path: ")? else {
        return Ok(Flow::Exit);
    };

    match write_json_snapshot(inventory, Path::new(&path)) {
        Ok(count) => console.say(format!("Exported {count} items to {path}."))?,
        Err(err) => console.say(format!("Error: {err:#}"))?,
    }
    Ok(Flow::Continue)
}

/// Writes every item, ordered by id, as a pretty-printed JSON array.
fn write_json_snapshot<R: ItemRepository>(
    inventory: &Inventory<R>,
    path: &Path,
) -> anyhow::Result<usize> {
    let items = inventory.list_all();
    let file = File::create(path)
        .with_context(|| format!("failed to create `{}`", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &items).context("failed to encode items")?;
    writer.flush().context("failed to write export file")?;

    info!(
        "event=inventory_export module=cli status=ok item_count={}",
        items.len()
    );
    Ok(items.len())
}

#[cfg(test)]
mod tests {
    use super::run;
    use inventory_core::{open_inventory_in_memory, Item, SqliteInventory};

    fn run_script(inventory: &mut SqliteInventory, script: &str) -> String {
        let mut out = Vec::new();
        run(inventory, script.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn add_then_list_prints_item() {
        let mut inventory = open_inventory_in_memory().unwrap();
        let output = run_script(&mut inventory, "1\n1\nHammer\n5\n9.99\n6\n0\n");

        assert!(output.contains("Item added."));
        assert!(output.contains("[1] Hammer | qty: 5 | price: $9.99"));
        assert!(output.ends_with("Exiting...\n"));
        assert_eq!(inventory.len(), 1);
    }

    #[test]
    fn invalid_number_reprompts_instead_of_failing() {
        let mut inventory = open_inventory_in_memory().unwrap();
        let output = run_script(&mut inventory, "1\nabc\n7\nSaw\nmany\n3\n12.5\n0\n");

        assert!(output.contains("Invalid input. Enter a whole number."));
        assert!(output.contains("Item added."));
        assert_eq!(inventory.get(7).unwrap().quantity, 3);
    }

    #[test]
    fn duplicate_and_negative_values_are_reported_and_loop_continues() {
        let mut inventory = open_inventory_in_memory().unwrap();
        inventory.add(Item::new(1, "Hammer", 5, 9.99)).unwrap();

        let output = run_script(
            &mut inventory,
            "1\n1\nWrench\n1\n1\n1\n2\nhammer\n1\n3\nDrill\n-4\n1\n0\n",
        );

        assert!(output.contains("Error: an item with id 1 already exists"));
        assert!(output.contains("Error: an item named 'hammer' already exists"));
        assert!(output.contains("Error: quantity cannot be negative, got -4"));
        // The duplicate name is caught before quantity and price are asked.
        assert_eq!(output.matches("Quantity: ").count(), 2);
        assert_eq!(inventory.len(), 1);
    }

    #[test]
    fn updates_and_delete_report_missing_ids() {
        let mut inventory = open_inventory_in_memory().unwrap();
        let output = run_script(&mut inventory, "3\n42\n5\n4\n42\n1.5\n2\n42\n0\n");

        assert_eq!(output.matches("No item with id 42.").count(), 3);
    }

    #[test]
    fn demo_load_search_and_report() {
        let mut inventory = open_inventory_in_memory().unwrap();
        let output = run_script(&mut inventory, "7\n7\n5\nHAM\n5\nzzz\n8\n0\n");

        assert!(output.contains("Loaded 4 demo items"));
        assert!(output.contains("Loaded 0 demo items"));
        assert!(output.contains("[1] Hammer | qty: 25 | price: $6.50"));
        assert!(output.contains("No matches."));
        assert!(output.contains("Items: 4 | Units: 175"));
    }

    #[test]
    fn end_of_input_exits_cleanly() {
        let mut inventory = open_inventory_in_memory().unwrap();

        let output = run_script(&mut inventory, "");
        assert!(output.ends_with("Exiting...\n"));

        let output = run_script(&mut inventory, "1\n5\nHalf");
        assert!(output.ends_with("Exiting...\n"));
        assert!(inventory.is_empty());
    }

    #[test]
    fn unknown_option_is_rejected() {
        let mut inventory = open_inventory_in_memory().unwrap();
        let output = run_script(&mut inventory, "42\n0\n");
        assert!(output.contains("Invalid option."));
    }

    #[test]
    fn export_writes_items_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        let mut inventory = open_inventory_in_memory().unwrap();
        inventory.add(Item::new(2, "Nails", 100, 3.0)).unwrap();
        inventory.add(Item::new(1, "Hammer", 5, 9.99)).unwrap();

        let output = run_script(&mut inventory, &format!("9\n{}\n0\n", path.display()));
        assert!(output.contains("Exported 2 items"));

        let exported: Vec<Item> =
            serde_json::from_reader(std::fs::File::open(&path).unwrap()).unwrap();
        assert_eq!(
            exported,
            vec![Item::new(1, "Hammer", 5, 9.99), Item::new(2, "Nails", 100, 3.0)]
        );
    }
}
