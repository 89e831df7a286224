use crate::domain::{ColumnId, Todo};

/// In-memory board: one ordered list per column.
///
/// At rest each list is sorted by `position` and positions are `0..n-1`.
/// While a drag is in flight the list order is the live order and the
/// `position` fields are stale until the drop renumbers them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardModel {
    columns: [Vec<Todo>; ColumnId::COUNT],
}

impl BoardModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<Todo>) -> Self {
        let mut board = Self::new();
        board.replace_all(items);
        board
    }

    pub fn all_items(&self) -> impl Iterator<Item = &Todo> {
        self.columns.iter().flatten()
    }

    pub fn column_view(&self, column: ColumnId) -> &[Todo] {
        &self.columns[column.index()]
    }

    /// Swap the whole collection, e.g. after a reload from storage.
    pub fn replace_all(&mut self, items: Vec<Todo>) {
        for list in self.columns.iter_mut() {
            list.clear();
        }
        for item in items {
            self.columns[item.column.index()].push(item);
        }
        for list in self.columns.iter_mut() {
            // stable: equal positions keep their incoming order
            list.sort_by_key(|t| t.position);
        }
    }

    pub fn upsert_one(&mut self, item: Todo) {
        if let Some((column, index)) = self.locate(&item.id) {
            let list = &mut self.columns[column.index()];
            if column == item.column && list[index].position == item.position {
                list[index] = item;
                return;
            }
            list.remove(index);
        }

        let list = &mut self.columns[item.column.index()];
        let at = list.partition_point(|t| t.position <= item.position);
        list.insert(at, item);
    }

    pub fn remove_one(&mut self, id: &str) -> Option<Todo> {
        let (column, index) = self.locate(id)?;
        Some(self.columns[column.index()].remove(index))
    }

    pub fn get(&self, id: &str) -> Option<&Todo> {
        self.locate(id)
            .map(|(column, index)| &self.columns[column.index()][index])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.locate(id).is_some()
    }

    /// Column and list index of an item.
    pub fn locate(&self, id: &str) -> Option<(ColumnId, usize)> {
        ColumnId::all().iter().find_map(|column| {
            self.columns[column.index()]
                .iter()
                .position(|t| t.id == id)
                .map(|index| (*column, index))
        })
    }

    pub fn len(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.iter().all(Vec::is_empty)
    }

    /// Position a new item appended to `column` should take.
    pub fn next_position(&self, column: ColumnId) -> i64 {
        self.column_view(column)
            .iter()
            .map(|t| t.position)
            .max()
            .map_or(0, |max| max + 1)
    }

    /// Whether every column holds positions `0..n-1` in list order.
    pub fn is_normalized(&self) -> bool {
        ColumnId::all().iter().all(|column| {
            self.column_view(*column)
                .iter()
                .enumerate()
                .all(|(index, t)| t.column == *column && t.position == index as i64)
        })
    }

    pub(crate) fn column_mut(&mut self, column: ColumnId) -> &mut Vec<Todo> {
        &mut self.columns[column.index()]
    }

    /// Array move inside one column: remove at `from`, insert at `to`.
    pub(crate) fn move_within(&mut self, column: ColumnId, from: usize, to: usize) {
        let list = self.column_mut(column);
        let item = list.remove(from);
        list.insert(to, item);
    }

    /// Take an item out of one column and insert it into another, at `to`
    /// or at the end. The item's `column` field follows it.
    pub(crate) fn transfer(
        &mut self,
        from: ColumnId,
        index: usize,
        to: ColumnId,
        at: Option<usize>,
    ) {
        let mut item = self.column_mut(from).remove(index);
        item.column = to;
        let list = self.column_mut(to);
        let at = at.unwrap_or(list.len()).min(list.len());
        list.insert(at, item);
    }
}
