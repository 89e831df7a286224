use sqlx::sqlite::SqlitePool;

use todo_board::board::BoardModel;
use todo_board::domain::{ColumnId, Todo, TodoRow};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:todo-board.db".into());
    let pool = SqlitePool::connect(&database_url).await?;

    let tables: Vec<String> = sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
        .fetch_all(&pool)
        .await?;

    println!("Tables: {}", tables.join(", "));

    let journal_mode: String = sqlx::query_scalar("PRAGMA journal_mode")
        .fetch_one(&pool)
        .await?;

    println!("Journal mode: {}", journal_mode);

    let users: Vec<(String, String)> = sqlx::query_as("SELECT id, name FROM users ORDER BY name")
        .fetch_all(&pool)
        .await?;

    let mut violations = 0;
    for (user_id, name) in users {
        let rows: Vec<TodoRow> =
            sqlx::query_as("SELECT * FROM todos WHERE user_id = ? ORDER BY position ASC")
                .bind(&user_id)
                .fetch_all(&pool)
                .await?;
        let todos = rows
            .into_iter()
            .map(Todo::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let board = BoardModel::from_items(todos);

        println!("User {}: {} todos", name, board.len());
        for column in ColumnId::all() {
            let positions: Vec<i64> = board.column_view(*column).iter().map(|t| t.position).collect();
            let dense = positions.iter().enumerate().all(|(i, p)| *p == i as i64);
            if !dense {
                violations += 1;
                println!("  {}: positions not dense: {:?}", column, positions);
            }
        }
    }

    println!("Columns violating the position invariant: {}", violations);

    Ok(())
}
