use std::{io::Write, sync::Arc};

use heapstore::{
    storage::{
        config::StorageConfig,
        heap_file::{HeapFile, Position},
        page_store::FilePageStore,
        schema::TupleDesc,
    },
    types::{
        error::{DatabaseError, Result as DbResult},
        tuple::Tuple,
        value::{Field, Type},
    },
};
use rustyline::{DefaultEditor, error::ReadlineError};
use tracing::error;
use tracing_subscriber::EnvFilter;

const DEFAULT_SCHEMA: &str = "id:int,score:double,name:char";
const HEAP_FILE_NAME: &str = "main";

type Heap = HeapFile<FilePageStore>;

fn read_multiline_command(rl: &mut DefaultEditor) -> rustyline::Result<String> {
    let mut input = String::new();
    let mut prompt = "heapstore> ".to_string();

    loop {
        let line = rl.readline(&prompt)?;
        let trimmed_line = line.trim_end();

        // Trailing backslash continues the command on the next line
        if let Some(line_without_backslash) = trimmed_line.strip_suffix('\\') {
            input.push_str(line_without_backslash);
            input.push(' ');
            prompt = "        -> ".to_string();
        } else {
            input.push_str(trimmed_line);
            break;
        }
    }

    Ok(input)
}

/// Parses `name:type,name:type,...`.
fn parse_schema(columns: &str) -> DbResult<TupleDesc> {
    let mut fields = Vec::new();
    for column in columns.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        let (name, field_type) =
            column
                .split_once(':')
                .ok_or_else(|| DatabaseError::InvalidValue {
                    value: column.to_string(),
                    field_type: "column".to_string(),
                })?;
        fields.push((field_type.trim().parse::<Type>()?, name.trim().to_string()));
    }
    TupleDesc::from_fields(fields)
}

fn parse_position(args: &[&str]) -> DbResult<Position> {
    let parse = |s: &str| {
        s.parse::<usize>().map_err(|_| DatabaseError::InvalidValue {
            value: s.to_string(),
            field_type: "position".to_string(),
        })
    };
    match args {
        [page, slot] => Ok(Position::new(parse(*page)?, parse(*slot)?)),
        _ => Err(DatabaseError::InvalidValue {
            value: args.join(" "),
            field_type: "position".to_string(),
        }),
    }
}

fn parse_tuple(td: &TupleDesc, args: &[&str]) -> DbResult<Tuple> {
    if args.len() != td.size() {
        return Err(DatabaseError::IncompatibleTuple {
            details: format!("expected {} values, got {}", td.size(), args.len()),
        });
    }
    let fields = td
        .types()
        .iter()
        .zip(args)
        .map(|(field_type, text)| Field::parse(*field_type, text))
        .collect::<DbResult<Vec<_>>>()?;
    Ok(Tuple::new(fields))
}

fn execute(heap: &Heap, command: &str, args: &[&str]) -> DbResult<()> {
    match command {
        "insert" => {
            let tuple = parse_tuple(heap.tuple_desc(), args)?;
            heap.insert_tuple(&tuple)?;
            println!("Inserted {}", tuple);
        }
        "get" => {
            let position = parse_position(args)?;
            println!("{} {}", position, heap.get_tuple(position)?);
        }
        "delete" => {
            let position = parse_position(args)?;
            heap.delete_tuple(position)?;
            println!("Deleted {}", position);
        }
        "scan" => {
            let mut count = 0;
            for item in heap.iter() {
                let (position, tuple) = item?;
                println!("{} {}", position, tuple);
                count += 1;
            }
            println!("{} tuple(s)", count);
        }
        "pages" => {
            println!(
                "{} page(s), {} slot(s) per page",
                heap.num_pages()?,
                heap.slots_per_page()
            );
        }
        "schema" => println!("{}", heap.tuple_desc()),
        "clear" => {
            print!("\x1B[2J\x1B[1;1H");
            std::io::stdout().flush()?;
        }
        _ => println!("Unknown command '{}'. Type 'help' for usage.", command),
    }
    Ok(())
}

fn process_command(heap: &Heap, command: &str) -> bool {
    let cmd = command.trim();
    let parts: Vec<&str> = cmd.split_whitespace().collect();

    match parts.first().map(|c| c.to_lowercase()).as_deref() {
        Some("exit" | "quit" | "q") => {
            println!("Goodbye!");
            return false;
        }
        Some("help" | "h") => {
            println!(
                r#"
Available commands:
  insert v1 v2 ...  - Insert a tuple (one value per field)
  get PAGE SLOT     - Print the tuple at a position
  delete PAGE SLOT  - Delete the tuple at a position
  scan              - Print every tuple with its position
  pages             - Show page count and slots per page
  schema            - Show the heap file schema
  help, h           - Show this help message
  clear             - Clear the screen
  exit, quit, q     - Exit

Use '\' at the end of a line for multiline input.
"#
            );
        }
        None => {}
        Some(command) => {
            if let Err(e) = execute(heap, command, &parts[1..]) {
                println!("Error: {}", e);
            }
        }
    }

    true
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = std::env::args().skip(1);
    let data_dir = args.next().unwrap_or_else(|| "./data".to_string());
    let schema = args.next().unwrap_or_else(|| DEFAULT_SCHEMA.to_string());

    let td = Arc::new(parse_schema(&schema)?);
    let store = FilePageStore::new(StorageConfig::new(&data_dir))?;
    let heap = HeapFile::new(HEAP_FILE_NAME, td, store)?;

    println!("heapstore: '{}' {} in {}", HEAP_FILE_NAME, heap.tuple_desc(), data_dir);

    let mut rl = DefaultEditor::new()?;
    loop {
        match read_multiline_command(&mut rl) {
            Ok(input) => {
                let command = input.trim().to_string();
                if !command.is_empty() {
                    rl.add_history_entry(&command)?;
                }
                if !process_command(&heap, &command) {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("Interrupted");
                break;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                error!("readline failed: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}
