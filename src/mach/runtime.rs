use super::console::Console;
use super::function::{Function, Rand};
use super::val::{self, Val};
use super::var::Var;
use crate::error;
use crate::lang::ast::{Expression, PrintItem, Statement, Target};
use crate::lang::{Error, Line};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::Bound;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

type Result<T> = std::result::Result<T, Error>;

const PRINT_ZONE: usize = 14;

/// The execution engine: program store, data items, both stacks, user
/// functions, the cursor, and the print column. One instance per
/// interpreter; nothing is shared.
pub struct Runtime {
    console: Box<dyn Console>,
    program: BTreeMap<u16, Rc<Line>>,
    data: Vec<String>,
    data_ptr: usize,
    functions: HashMap<String, UserFn>,
    vars: Var,
    call_stack: Vec<CallFrame>,
    loop_stack: Vec<LoopFrame>,
    cursor: Cursor,
    running: bool,
    stop: bool,
    print_col: usize,
    rand: Rand,
    interrupt: Option<Arc<AtomicBool>>,
}

/// Where execution resumes: line number and statement index within the
/// line. Line 0 stands for a direct-mode line.
#[derive(Debug, Clone, Copy)]
struct Cursor {
    line: u16,
    stmt: usize,
}

#[derive(Debug, Clone)]
struct LoopFrame {
    var: String,
    end: f64,
    step: f64,
    line: u16,
    stmt: usize,
}

#[derive(Debug, Clone, Copy)]
struct CallFrame {
    line: u16,
    stmt: usize,
}

struct UserFn {
    param: String,
    body: Rc<Expression>,
}

/// What a statement did to the cursor. `Jump` means the cursor was
/// repositioned and the line walker must not advance past it.
enum Flow {
    Next,
    Jump,
}

impl Runtime {
    pub fn new(console: Box<dyn Console>) -> Runtime {
        Runtime {
            console,
            program: BTreeMap::new(),
            data: vec![],
            data_ptr: 0,
            functions: HashMap::new(),
            vars: Var::new(),
            call_stack: vec![],
            loop_stack: vec![],
            cursor: Cursor { line: 0, stmt: 0 },
            running: false,
            stop: false,
            print_col: 0,
            rand: Rand::new(),
            interrupt: None,
        }
    }

    /// Arm a flag a Ctrl-C handler can set; the main loop polls it and
    /// reports `BREAK IN n`.
    pub fn set_interrupt(&mut self, flag: Arc<AtomicBool>) {
        self.interrupt = Some(flag);
    }

    /// Process one line of input: execute it when direct, store or delete
    /// it when numbered. Returns whether the line is worth remembering in
    /// history.
    pub fn process_line(&mut self, source: &str) -> bool {
        let source = source.trim_end_matches(|c| c == '\r' || c == '\n');
        if source.trim().is_empty() {
            return false;
        }
        let line = match Line::parse(source) {
            Ok(line) => line,
            Err(error) => {
                self.report(error);
                return true;
            }
        };
        match line.number() {
            None => self.execute_direct(line),
            Some(number) => {
                if line.statements().is_empty() {
                    self.program.remove(&number);
                } else {
                    self.program.insert(number, Rc::new(line));
                }
            }
        }
        true
    }

    /// Run the stored program from its lowest line number.
    pub fn run(&mut self) {
        if self.program.is_empty() {
            return;
        }
        self.vars.clear();
        self.call_stack.clear();
        self.loop_stack.clear();
        self.collect_data();
        let first = *self.program.keys().next().unwrap();
        self.cursor = Cursor { line: first, stmt: 0 };
        match self.main_loop() {
            Ok(()) => self.ensure_newline(),
            Err(error) => self.report(error),
        }
    }

    fn execute_direct(&mut self, line: Line) {
        if line.statements().is_empty() {
            return;
        }
        self.cursor = Cursor { line: 0, stmt: 0 };
        self.stop = false;
        let line = Rc::new(line);
        let result = if is_command(&line.statements()[0]) {
            self.execute_statement(&line.statements()[0], line.statements())
                .map(|_| ())
        } else {
            self.execute_line(&line)
        };
        match result {
            Ok(()) => {
                if !self.running {
                    self.print_ok();
                }
            }
            Err(error) => self.report(error),
        }
    }

    fn main_loop(&mut self) -> Result<()> {
        self.running = true;
        self.stop = false;
        let result = self.execute_program();
        self.running = false;
        result
    }

    fn execute_program(&mut self) -> Result<()> {
        while self.running && !self.stop {
            if self.interrupted() {
                self.break_in();
                break;
            }
            let line = match self.program.get(&self.cursor.line) {
                Some(line) => Rc::clone(line),
                None => break,
            };
            let original = self.cursor.line;
            self.execute_line(&line)?;
            if self.cursor.line == original {
                match self.next_line(original) {
                    Some(number) => self.cursor = Cursor { line: number, stmt: 0 },
                    None => break,
                }
            }
        }
        Ok(())
    }

    /// Execute a line's statements from the cursor's statement index. A
    /// jump to another line breaks out so the main loop observes it; a
    /// jump within the line continues at the new index.
    fn execute_line(&mut self, line: &Rc<Line>) -> Result<()> {
        let statements = line.statements();
        let this_line = self.cursor.line;
        while self.cursor.stmt < statements.len() {
            if self.stop {
                break;
            }
            match self.execute_statement(&statements[self.cursor.stmt], statements)? {
                Flow::Jump => {
                    if self.cursor.line != this_line {
                        return Ok(());
                    }
                }
                Flow::Next => self.cursor.stmt += 1,
            }
        }
        Ok(())
    }

    fn execute_statement(&mut self, statement: &Statement, statements: &[Statement]) -> Result<Flow> {
        match statement {
            Statement::Clear => {
                self.vars.clear();
                Ok(Flow::Next)
            }
            Statement::Data(_) => Ok(Flow::Next),
            Statement::Def { name, param, body } => {
                let function = UserFn {
                    param: param.clone(),
                    body: Rc::clone(body),
                };
                self.functions.insert(name.clone(), function);
                Ok(Flow::Next)
            }
            Statement::Dim(declarations) => {
                for (name, sizes) in declarations {
                    let sizes = self.eval_indexes(sizes)?;
                    self.vars.dim(name, &sizes)?;
                }
                Ok(Flow::Next)
            }
            Statement::End => {
                self.stop = true;
                Ok(Flow::Next)
            }
            Statement::For {
                var,
                from,
                to,
                step,
            } => self.execute_for(var, from, to, step.as_ref(), statements),
            Statement::Gosub(number) => self.jump_gosub(*number),
            Statement::Goto(number) => self.jump_goto(*number),
            Statement::If { cond, then } => {
                if self.eval_num(cond)? != 0.0 {
                    for statement in then {
                        if self.stop {
                            break;
                        }
                        if let Flow::Jump = self.execute_statement(statement, statements)? {
                            return Ok(Flow::Jump);
                        }
                    }
                }
                Ok(Flow::Next)
            }
            Statement::Input { prompt, targets } => self.execute_input(prompt, targets),
            Statement::Let { target, expr } => {
                let value = self.eval(expr)?;
                self.assign(target, value)?;
                Ok(Flow::Next)
            }
            Statement::List => {
                for (number, line) in &self.program {
                    let text = format!("{} {}\n", number, line.text());
                    self.console.write(&text);
                }
                self.print_col = 0;
                Ok(Flow::Next)
            }
            Statement::New => {
                self.program.clear();
                self.vars.clear();
                self.data.clear();
                self.data_ptr = 0;
                self.functions.clear();
                self.call_stack.clear();
                self.loop_stack.clear();
                Ok(Flow::Next)
            }
            Statement::Next(var) => self.execute_next(var.as_deref()),
            Statement::On {
                expr,
                gosub,
                targets,
            } => {
                let index = self.eval_num(expr)?.trunc();
                if index < 1.0 || index > targets.len() as f64 {
                    return Ok(Flow::Next);
                }
                let number = targets[index as usize - 1];
                if *gosub {
                    self.jump_gosub(number)
                } else {
                    self.jump_goto(number)
                }
            }
            Statement::Print(items) => self.execute_print(items),
            Statement::Read(targets) => {
                for target in targets {
                    let item = match self.data.get(self.data_ptr) {
                        Some(item) => item.clone(),
                        None => return Err(error!(OutOfData)),
                    };
                    let value = if Var::is_string(target.name()) {
                        Val::String(item)
                    } else {
                        match val::parse_number(&item) {
                            Some(number) => Val::Number(number),
                            None => return Err(error!(SyntaxError)),
                        }
                    };
                    self.assign(target, value)?;
                    self.data_ptr += 1;
                }
                Ok(Flow::Next)
            }
            Statement::Rem => Ok(Flow::Next),
            Statement::Restore => {
                self.data_ptr = 0;
                Ok(Flow::Next)
            }
            Statement::Return => {
                let frame = match self.call_stack.pop() {
                    Some(frame) => frame,
                    None => return Err(error!(ReturnWithoutGosub)),
                };
                self.cursor = Cursor {
                    line: frame.line,
                    stmt: frame.stmt,
                };
                Ok(Flow::Jump)
            }
            Statement::Run => {
                if !self.running {
                    self.vars.clear();
                    self.call_stack.clear();
                    self.loop_stack.clear();
                }
                self.collect_data();
                let first = match self.program.keys().next() {
                    Some(&number) => number,
                    None => return Ok(Flow::Next),
                };
                self.cursor = Cursor { line: first, stmt: 0 };
                if !self.running {
                    self.main_loop()?;
                }
                Ok(Flow::Jump)
            }
            Statement::Stop => {
                self.break_in();
                Ok(Flow::Next)
            }
        }
    }

    fn execute_for(
        &mut self,
        var: &str,
        from: &Expression,
        to: &Expression,
        step: Option<&Expression>,
        statements: &[Statement],
    ) -> Result<Flow> {
        let start = self.eval_num(from)?;
        let end = self.eval_num(to)?;
        let step = match step {
            Some(expr) => self.eval_num(expr)?,
            None => 1.0,
        };
        self.vars.set_num(var, start)?;
        let runs = if step > 0.0 { start <= end } else { start >= end };
        if !runs {
            return self.skip_loop(statements);
        }
        // The frame resumes at the statement after this FOR: on the same
        // line if it has one, else at the start of the next line.
        let (line, stmt) = if self.cursor.stmt + 1 < statements.len() {
            (self.cursor.line, self.cursor.stmt + 1)
        } else {
            (self.next_line(self.cursor.line).unwrap_or(self.cursor.line), 0)
        };
        self.loop_stack.push(LoopFrame {
            var: var.to_string(),
            end,
            step,
            line,
            stmt,
        });
        Ok(Flow::Next)
    }

    /// A FOR whose body never runs: scan forward over the remaining
    /// statements and the following lines, counting nested pairs, until
    /// the matching NEXT; resume on the line after it.
    fn skip_loop(&mut self, statements: &[Statement]) -> Result<Flow> {
        let mut depth = 1;
        for statement in &statements[self.cursor.stmt + 1..] {
            match statement {
                Statement::For { .. } => depth += 1,
                Statement::Next(_) => {
                    depth -= 1;
                    if depth == 0 {
                        return self.continue_after(self.cursor.line);
                    }
                }
                _ => {}
            }
        }
        let mut at = self.cursor.line;
        loop {
            let number = match self.next_line(at) {
                Some(number) => number,
                None => {
                    self.stop = true;
                    return Ok(Flow::Next);
                }
            };
            let line = Rc::clone(&self.program[&number]);
            for statement in line.statements() {
                match statement {
                    Statement::For { .. } => depth += 1,
                    Statement::Next(_) => {
                        depth -= 1;
                        if depth == 0 {
                            return self.continue_after(number);
                        }
                    }
                    _ => {}
                }
            }
            at = number;
        }
    }

    fn continue_after(&mut self, line: u16) -> Result<Flow> {
        match self.next_line(line) {
            Some(number) => {
                self.cursor = Cursor { line: number, stmt: 0 };
                Ok(Flow::Jump)
            }
            None => {
                self.stop = true;
                Ok(Flow::Next)
            }
        }
    }

    fn execute_next(&mut self, var: Option<&str>) -> Result<Flow> {
        let frame = match self.loop_stack.last() {
            Some(frame) => frame.clone(),
            None => return Err(error!(NextWithoutFor)),
        };
        if let Some(name) = var {
            if name != frame.var {
                return Err(error!(NextWithoutFor));
            }
        }
        let value = self.vars.get_num(&frame.var) + frame.step;
        self.vars.set_num(&frame.var, value)?;
        let continues = if frame.step > 0.0 {
            value <= frame.end
        } else {
            value >= frame.end
        };
        if continues {
            self.cursor = Cursor {
                line: frame.line,
                stmt: frame.stmt,
            };
            Ok(Flow::Jump)
        } else {
            self.loop_stack.pop();
            Ok(Flow::Next)
        }
    }

    fn jump_goto(&mut self, number: u16) -> Result<Flow> {
        self.cleanup_loops(self.cursor.line, number);
        if !self.program.contains_key(&number) {
            return Err(error!(UndefinedLineNumber));
        }
        self.cursor = Cursor { line: number, stmt: 0 };
        if !self.running {
            self.collect_data();
            self.main_loop()?;
        }
        Ok(Flow::Jump)
    }

    fn jump_gosub(&mut self, number: u16) -> Result<Flow> {
        if !self.program.contains_key(&number) {
            return Err(error!(UndefinedLineNumber));
        }
        self.call_stack.push(CallFrame {
            line: self.cursor.line,
            stmt: self.cursor.stmt + 1,
        });
        self.cursor = Cursor { line: number, stmt: 0 };
        Ok(Flow::Jump)
    }

    /// A GOTO that jumps over a NEXT terminates that loop: collect the
    /// loop variables of every NEXT strictly between the two lines (a bare
    /// NEXT counts as the top frame's variable) and drop their frames.
    fn cleanup_loops(&mut self, from: u16, to: u16) {
        let (low, high) = if from < to { (from, to) } else { (to, from) };
        let mut skipped: HashSet<String> = HashSet::new();
        for (_, line) in self
            .program
            .range((Bound::Excluded(low), Bound::Excluded(high)))
        {
            for statement in line.statements() {
                if let Statement::Next(var) = statement {
                    match var {
                        Some(name) => {
                            skipped.insert(name.clone());
                        }
                        None => {
                            if let Some(frame) = self.loop_stack.last() {
                                skipped.insert(frame.var.clone());
                            }
                        }
                    }
                }
            }
        }
        self.loop_stack.retain(|frame| !skipped.contains(&frame.var));
    }

    fn execute_print(&mut self, items: &[PrintItem]) -> Result<Flow> {
        let has_content = items.iter().any(|item| match item {
            PrintItem::Expr(Expression::NumericFn(name, _)) if name == "TAB" => false,
            PrintItem::Expr(_) => true,
            _ => false,
        });
        let mut newline = true;
        for (at, item) in items.iter().enumerate() {
            let last = at + 1 == items.len();
            match item {
                PrintItem::Comma => {
                    let zone = (self.print_col / PRINT_ZONE + 1) * PRINT_ZONE;
                    self.pad_to(zone);
                    if last {
                        newline = false;
                    }
                }
                PrintItem::Semicolon => {
                    if last {
                        newline = false;
                    }
                }
                PrintItem::Expr(Expression::NumericFn(name, args)) if name == "TAB" => {
                    if args.len() != 1 {
                        return Err(error!(SyntaxError));
                    }
                    let n = self.eval_num(&args[0])?;
                    let column = (n.trunc() as i64 - 1).max(0).min(255) as usize;
                    if column > self.print_col {
                        self.pad_to(column);
                    }
                }
                PrintItem::Expr(expr) => match self.eval(expr)? {
                    Val::Number(number) => {
                        let text = val::format_number(number);
                        self.write_print(&text);
                    }
                    Val::String(text) => self.write_print(&text),
                },
            }
        }
        if !has_content && !items.is_empty() {
            newline = false;
        }
        if newline {
            self.console.write("\n");
            self.print_col = 0;
        }
        Ok(Flow::Next)
    }

    fn execute_input(&mut self, prompt: &str, targets: &[Target]) -> Result<Flow> {
        if targets.is_empty() {
            let _ = self.console.read_line(prompt);
            return Ok(Flow::Next);
        }
        let mut first = true;
        'redo: loop {
            let mut next_prompt = if first {
                prompt.to_string()
            } else {
                "? ".to_string()
            };
            first = false;
            let mut values: Vec<String> = vec![];
            while values.len() < targets.len() {
                let line = match self.console.read_line(&next_prompt) {
                    Some(line) => line,
                    None => return Ok(Flow::Next),
                };
                for piece in line.split(',') {
                    values.push(piece.trim_matches(|c| c == ' ' || c == '\t').to_string());
                }
                next_prompt = "?? ".to_string();
            }
            for (target, value) in targets.iter().zip(&values) {
                if !Var::is_string(target.name()) && val::parse_number(value).is_none() {
                    self.console.write("REDO FROM START\n");
                    continue 'redo;
                }
            }
            for (target, value) in targets.iter().zip(&values) {
                let value = if Var::is_string(target.name()) {
                    Val::String(value.clone())
                } else {
                    Val::Number(val::parse_number(value).unwrap())
                };
                self.assign(target, value)?;
            }
            return Ok(Flow::Next);
        }
    }

    fn assign(&mut self, target: &Target, value: Val) -> Result<()> {
        match target {
            Target::Scalar(name) => {
                if Var::is_string(name) {
                    self.vars.set_str(name, value.string()?)
                } else {
                    self.vars.set_num(name, value.number()?)
                }
            }
            Target::Element(name, indexes) => {
                let indexes = self.eval_indexes(indexes)?;
                self.vars.store_elem(name, &indexes, value)
            }
        }
    }

    fn eval(&mut self, expr: &Expression) -> Result<Val> {
        match expr {
            Expression::Number(number) => Ok(Val::Number(*number)),
            Expression::String(s) => Ok(Val::String(s.clone())),
            Expression::Var(name) => {
                if Var::is_string(name) {
                    Ok(Val::String(self.vars.get_str(name)))
                } else {
                    Ok(Val::Number(self.vars.get_num(name)))
                }
            }
            Expression::NumericFn(name, args) => self.call_numeric(name, args),
            Expression::StringFn(name, args) => self.call_string(name, args),
            Expression::Element(name, args) => {
                if self.functions.contains_key(name) {
                    return self.call_user(name, args);
                }
                if name.starts_with("FN") {
                    return Err(error!(UndefinedFunction));
                }
                let indexes = self.eval_indexes(args)?;
                self.vars.fetch_elem(name, &indexes)
            }
            Expression::Binary(op, lhs, rhs) => {
                let lhs = self.eval(lhs)?;
                let rhs = self.eval(rhs)?;
                Val::binary(*op, lhs, rhs)
            }
            Expression::Unary(op, operand) => {
                let operand = self.eval(operand)?;
                Val::unary(*op, operand)
            }
        }
    }

    fn eval_num(&mut self, expr: &Expression) -> Result<f64> {
        self.eval(expr)?.number()
    }

    fn eval_str(&mut self, expr: &Expression) -> Result<String> {
        self.eval(expr)?.string()
    }

    fn eval_indexes(&mut self, expressions: &[Expression]) -> Result<Vec<i64>> {
        let mut indexes = Vec::with_capacity(expressions.len());
        for expr in expressions {
            indexes.push(self.eval_num(expr)?.trunc() as i64);
        }
        Ok(indexes)
    }

    fn call_numeric(&mut self, name: &str, args: &[Expression]) -> Result<Val> {
        match name {
            "LEN" | "ASC" | "VAL" => {
                if args.len() != 1 {
                    return Err(error!(SyntaxError));
                }
                let s = self.eval_str(&args[0])?;
                Function::call_string_arg(name, &s).map(Val::Number)
            }
            "RND" => {
                let arg = match args.len() {
                    0 => None,
                    1 => Some(self.eval_num(&args[0])?),
                    _ => return Err(error!(SyntaxError)),
                };
                Ok(Val::Number(self.rand.rnd(arg)))
            }
            _ => {
                let mut numbers = Vec::with_capacity(args.len());
                for arg in args {
                    numbers.push(self.eval_num(arg)?);
                }
                Function::call_numeric(name, &numbers).map(Val::Number)
            }
        }
    }

    fn call_string(&mut self, name: &str, args: &[Expression]) -> Result<Val> {
        let result = match name {
            "CHR$" => {
                if args.len() != 1 {
                    return Err(error!(SyntaxError));
                }
                Function::chr(self.eval_num(&args[0])?)?
            }
            "LEFT$" | "RIGHT$" => {
                if args.len() != 2 {
                    return Err(error!(SyntaxError));
                }
                let s = self.eval_str(&args[0])?;
                let len = self.eval_num(&args[1])?;
                if name == "LEFT$" {
                    Function::left(&s, len)
                } else {
                    Function::right(&s, len)
                }
            }
            "MID$" => {
                if args.len() < 2 || args.len() > 3 {
                    return Err(error!(SyntaxError));
                }
                let s = self.eval_str(&args[0])?;
                let start = self.eval_num(&args[1])?;
                let len = match args.get(2) {
                    Some(expr) => Some(self.eval_num(expr)?),
                    None => None,
                };
                Function::mid(&s, start, len)
            }
            "STR$" => {
                if args.len() != 1 {
                    return Err(error!(SyntaxError));
                }
                Function::str(self.eval_num(&args[0])?)
            }
            _ => return Err(error!(UndefinedFunction)),
        };
        Ok(Val::String(result))
    }

    /// User-defined function call. The parameter is a plain global
    /// numeric variable; the write is observable after the call.
    fn call_user(&mut self, name: &str, args: &[Expression]) -> Result<Val> {
        if args.len() != 1 {
            return Err(error!(SyntaxError));
        }
        let (param, body) = {
            let function = &self.functions[name];
            (function.param.clone(), Rc::clone(&function.body))
        };
        let arg = self.eval_num(&args[0])?;
        self.vars.set_num(&param, arg)?;
        self.eval(&body)
    }

    /// Harvest DATA items from the stored program in line order.
    fn collect_data(&mut self) {
        self.data.clear();
        self.data_ptr = 0;
        for line in self.program.values() {
            for statement in line.statements() {
                if let Statement::Data(items) = statement {
                    self.data.extend(items.iter().cloned());
                }
            }
        }
    }

    fn next_line(&self, after: u16) -> Option<u16> {
        self.program
            .range((Bound::Excluded(after), Bound::Unbounded))
            .next()
            .map(|(&number, _)| number)
    }

    fn interrupted(&self) -> bool {
        match &self.interrupt {
            Some(flag) => flag.swap(false, Ordering::SeqCst),
            None => false,
        }
    }

    fn break_in(&mut self) {
        self.ensure_newline();
        let text = format!("BREAK IN {}\n", self.cursor.line);
        self.console.write(&text);
        self.stop = true;
    }

    fn report(&mut self, error: Error) {
        self.ensure_newline();
        self.console.write_message(&format!("{}\n", error));
        self.running = false;
        self.console.write("OK\n");
    }

    fn print_ok(&mut self) {
        self.ensure_newline();
        self.console.write("OK\n");
    }

    fn ensure_newline(&mut self) {
        if self.print_col > 0 {
            self.console.write("\n");
            self.print_col = 0;
        }
    }

    fn write_print(&mut self, text: &str) {
        self.console.write(text);
        self.print_col += text.chars().count();
    }

    fn pad_to(&mut self, column: usize) {
        if column > self.print_col {
            let spaces = " ".repeat(column - self.print_col);
            self.console.write(&spaces);
            self.print_col = column;
        }
    }
}

impl Default for Runtime {
    fn default() -> Runtime {
        Runtime::new(Box::new(super::console::StdioConsole::new()))
    }
}

fn is_command(statement: &Statement) -> bool {
    matches!(
        statement,
        Statement::List
            | Statement::New
            | Statement::Run
            | Statement::Clear
            | Statement::Goto(_)
            | Statement::Gosub(_)
    )
}
