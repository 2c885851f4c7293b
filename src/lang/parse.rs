use super::ast::*;
use super::token::*;
use super::{Error, LineNumber, MaxValue};
use crate::error;
use crate::mach::Function;
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

/// Parse the tokens of a single line into its statements.
pub fn parse(tokens: &[Token]) -> Result<Vec<Statement>> {
    Parse {
        tokens: tokens.iter().peekable(),
    }
    .program()
}

struct Parse<'a> {
    tokens: std::iter::Peekable<std::slice::Iter<'a, Token>>,
}

impl<'a> Parse<'a> {
    fn next(&mut self) -> Option<&'a Token> {
        self.tokens.next()
    }

    fn peek(&mut self) -> Option<&'a Token> {
        self.tokens.peek().copied()
    }

    fn expect(&mut self, token: &Token) -> Result<()> {
        match self.next() {
            Some(t) if t == token => Ok(()),
            _ => Err(error!(SyntaxError)),
        }
    }

    fn program(&mut self) -> Result<Vec<Statement>> {
        let mut statements = vec![];
        loop {
            while let Some(Token::Colon) = self.peek() {
                self.next();
            }
            if self.peek().is_none() {
                break;
            }
            statements.push(self.statement()?);
            match self.peek() {
                None => break,
                Some(Token::Colon) => {
                    self.next();
                }
                Some(_) => return Err(error!(SyntaxError)),
            }
        }
        Ok(statements)
    }

    fn statement(&mut self) -> Result<Statement> {
        use Word::*;
        let word = match self.peek() {
            Some(Token::Word(word)) => word.clone(),
            Some(Token::Ident(_)) => return self.assignment(),
            _ => return Err(error!(SyntaxError)),
        };
        self.next();
        match word {
            Print => self.print_statement(),
            Input => self.input_statement(),
            Let => self.assignment(),
            If => self.if_statement(),
            For => self.for_statement(),
            Next => self.next_statement(),
            Goto => Ok(Statement::Goto(self.line_ref()?)),
            Gosub => Ok(Statement::Gosub(self.line_ref()?)),
            Return => Ok(Statement::Return),
            Rem => self.rem_statement(),
            Data => self.data_statement(),
            Read => Ok(Statement::Read(self.target_list()?)),
            Restore => Ok(Statement::Restore),
            End => Ok(Statement::End),
            Stop => Ok(Statement::Stop),
            On => self.on_statement(),
            List => Ok(Statement::List),
            New => Ok(Statement::New),
            Run => Ok(Statement::Run),
            Clear => Ok(Statement::Clear),
            Dim => self.dim_statement(),
            Def => self.def_statement(),
            Then | To | Step | Else | Fn => Err(error!(UndefinedStatement)),
        }
    }

    fn assignment(&mut self) -> Result<Statement> {
        let target = self.target()?;
        self.expect(&Token::Operator(Operator::Equal))?;
        let expr = self.expression()?;
        Ok(Statement::Let { target, expr })
    }

    fn print_statement(&mut self) -> Result<Statement> {
        let mut items = vec![];
        loop {
            match self.peek() {
                None | Some(Token::Colon) => break,
                Some(Token::Comma) => {
                    self.next();
                    items.push(PrintItem::Comma);
                }
                Some(Token::Semicolon) => {
                    self.next();
                    items.push(PrintItem::Semicolon);
                }
                Some(_) => items.push(PrintItem::Expr(self.expression()?)),
            }
        }
        Ok(Statement::Print(items))
    }

    fn input_statement(&mut self) -> Result<Statement> {
        let prompt = match self.peek() {
            Some(Token::Literal(Literal::String(s))) => {
                let s = s.clone();
                self.next();
                match self.peek() {
                    Some(Token::Semicolon) => {
                        self.next();
                        format!("{}? ", s)
                    }
                    Some(Token::Comma) => {
                        self.next();
                        format!("{}?", s)
                    }
                    _ => format!("{}?", s),
                }
            }
            _ => "? ".to_string(),
        };
        let targets = self.target_list()?;
        Ok(Statement::Input { prompt, targets })
    }

    fn if_statement(&mut self) -> Result<Statement> {
        let cond = self.expression()?;
        self.expect(&Token::Word(Word::Then))?;
        let mut then = vec![];
        if let Some(Token::Literal(Literal::Number(s))) = self.peek() {
            let number = line_number(s)?;
            self.next();
            then.push(Statement::Goto(number));
        } else {
            loop {
                then.push(self.statement()?);
                match self.peek() {
                    Some(Token::Colon) => {
                        self.next();
                    }
                    _ => break,
                }
            }
        }
        Ok(Statement::If { cond, then })
    }

    fn for_statement(&mut self) -> Result<Statement> {
        let var = self.ident_name()?;
        if var.ends_with('$') {
            return Err(error!(SyntaxError));
        }
        self.expect(&Token::Operator(Operator::Equal))?;
        let from = self.expression()?;
        self.expect(&Token::Word(Word::To))?;
        let to = self.expression()?;
        let step = match self.peek() {
            Some(Token::Word(Word::Step)) => {
                self.next();
                Some(self.expression()?)
            }
            _ => None,
        };
        Ok(Statement::For {
            var,
            from,
            to,
            step,
        })
    }

    fn next_statement(&mut self) -> Result<Statement> {
        match self.peek() {
            Some(Token::Ident(ident)) => {
                let name = ident.name().to_string();
                self.next();
                Ok(Statement::Next(Some(name)))
            }
            _ => Ok(Statement::Next(None)),
        }
    }

    fn rem_statement(&mut self) -> Result<Statement> {
        if let Some(Token::Remark(_)) = self.peek() {
            self.next();
        }
        Ok(Statement::Rem)
    }

    fn data_statement(&mut self) -> Result<Statement> {
        let mut items = vec![];
        loop {
            match self.peek() {
                Some(Token::Literal(Literal::Number(s))) => {
                    items.push(s.clone());
                    self.next();
                }
                Some(Token::Literal(Literal::String(s))) => {
                    items.push(s.clone());
                    self.next();
                }
                Some(Token::Ident(ident)) => {
                    items.push(ident.name().to_string());
                    self.next();
                }
                Some(Token::Operator(Operator::Minus)) => {
                    self.next();
                    match self.next() {
                        Some(Token::Literal(Literal::Number(s))) => {
                            items.push(format!("-{}", s));
                        }
                        _ => return Err(error!(SyntaxError)),
                    }
                }
                _ => break,
            }
            match self.peek() {
                Some(Token::Comma) => {
                    self.next();
                }
                _ => break,
            }
        }
        Ok(Statement::Data(items))
    }

    fn on_statement(&mut self) -> Result<Statement> {
        let expr = self.expression()?;
        let gosub = match self.next() {
            Some(Token::Word(Word::Goto)) => false,
            Some(Token::Word(Word::Gosub)) => true,
            _ => return Err(error!(SyntaxError)),
        };
        let mut targets = vec![self.line_ref()?];
        while let Some(Token::Comma) = self.peek() {
            self.next();
            targets.push(self.line_ref()?);
        }
        Ok(Statement::On {
            expr,
            gosub,
            targets,
        })
    }

    fn dim_statement(&mut self) -> Result<Statement> {
        let mut declarations = vec![];
        loop {
            let name = self.ident_name()?;
            self.expect(&Token::LParen)?;
            let sizes = self.expression_list()?;
            self.expect(&Token::RParen)?;
            declarations.push((name, sizes));
            match self.peek() {
                Some(Token::Comma) => {
                    self.next();
                }
                _ => break,
            }
        }
        Ok(Statement::Dim(declarations))
    }

    fn def_statement(&mut self) -> Result<Statement> {
        let name = self.ident_name()?;
        if !name.starts_with("FN") || name.ends_with('$') {
            return Err(error!(SyntaxError));
        }
        self.expect(&Token::LParen)?;
        let param = self.ident_name()?;
        if param.ends_with('$') {
            return Err(error!(SyntaxError));
        }
        self.expect(&Token::RParen)?;
        self.expect(&Token::Operator(Operator::Equal))?;
        let body = self.expression()?;
        Ok(Statement::Def {
            name,
            param,
            body: Rc::new(body),
        })
    }

    fn ident_name(&mut self) -> Result<String> {
        match self.next() {
            Some(Token::Ident(ident)) => Ok(ident.name().to_string()),
            _ => Err(error!(SyntaxError)),
        }
    }

    fn line_ref(&mut self) -> Result<u16> {
        match self.next() {
            Some(Token::Literal(Literal::Number(s))) => line_number(s),
            _ => Err(error!(SyntaxError)),
        }
    }

    fn target(&mut self) -> Result<Target> {
        let name = self.ident_name()?;
        if let Some(Token::LParen) = self.peek() {
            self.next();
            let indexes = self.expression_list()?;
            self.expect(&Token::RParen)?;
            Ok(Target::Element(name, indexes))
        } else {
            Ok(Target::Scalar(name))
        }
    }

    fn target_list(&mut self) -> Result<Vec<Target>> {
        let mut targets = vec![];
        while let Some(Token::Ident(_)) = self.peek() {
            targets.push(self.target()?);
            match self.peek() {
                Some(Token::Comma) => {
                    self.next();
                }
                _ => break,
            }
        }
        Ok(targets)
    }

    fn expression_list(&mut self) -> Result<Vec<Expression>> {
        let mut expressions = vec![self.expression()?];
        while let Some(Token::Comma) = self.peek() {
            self.next();
            expressions.push(self.expression()?);
        }
        Ok(expressions)
    }

    fn expression(&mut self) -> Result<Expression> {
        self.or_expression()
    }

    fn or_expression(&mut self) -> Result<Expression> {
        let mut left = self.and_expression()?;
        while let Some(Token::Operator(Operator::Or)) = self.peek() {
            self.next();
            let right = self.and_expression()?;
            left = Expression::Binary(BinOp::Or, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and_expression(&mut self) -> Result<Expression> {
        let mut left = self.relational()?;
        while let Some(Token::Operator(Operator::And)) = self.peek() {
            self.next();
            let right = self.relational()?;
            left = Expression::Binary(BinOp::And, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn relational(&mut self) -> Result<Expression> {
        let mut left = self.additive()?;
        loop {
            let op = match self.peek() {
                Some(Token::Operator(Operator::Equal)) => BinOp::Equal,
                Some(Token::Operator(Operator::NotEqual)) => BinOp::NotEqual,
                Some(Token::Operator(Operator::Less)) => BinOp::Less,
                Some(Token::Operator(Operator::LessEqual)) => BinOp::LessEqual,
                Some(Token::Operator(Operator::Greater)) => BinOp::Greater,
                Some(Token::Operator(Operator::GreaterEqual)) => BinOp::GreaterEqual,
                _ => break,
            };
            self.next();
            let right = self.additive()?;
            left = Expression::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn additive(&mut self) -> Result<Expression> {
        let mut left = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Operator(Operator::Plus)) => BinOp::Add,
                Some(Token::Operator(Operator::Minus)) => BinOp::Subtract,
                _ => break,
            };
            self.next();
            let right = self.term()?;
            left = Expression::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn term(&mut self) -> Result<Expression> {
        let mut left = self.factor()?;
        loop {
            let op = match self.peek() {
                Some(Token::Operator(Operator::Multiply)) => BinOp::Multiply,
                Some(Token::Operator(Operator::Divide)) => BinOp::Divide,
                _ => break,
            };
            self.next();
            let right = self.factor()?;
            left = Expression::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn factor(&mut self) -> Result<Expression> {
        let mut left = self.primary()?;
        while let Some(Token::Operator(Operator::Caret)) = self.peek() {
            self.next();
            let right = self.primary()?;
            left = Expression::Binary(BinOp::Power, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn primary(&mut self) -> Result<Expression> {
        match self.next() {
            Some(Token::Literal(Literal::Number(s))) => match s.parse::<f64>() {
                Ok(number) => Ok(Expression::Number(number)),
                Err(_) => Err(error!(SyntaxError)),
            },
            Some(Token::Literal(Literal::String(s))) => Ok(Expression::String(s.clone())),
            Some(Token::Ident(ident)) => {
                let name = ident.name().to_string();
                if let Some(Token::LParen) = self.peek() {
                    self.next();
                    let args = match self.peek() {
                        Some(Token::RParen) => vec![],
                        _ => self.expression_list()?,
                    };
                    self.expect(&Token::RParen)?;
                    if Function::is_string(&name) {
                        Ok(Expression::StringFn(name, args))
                    } else if Function::is_numeric(&name) {
                        Ok(Expression::NumericFn(name, args))
                    } else if args.is_empty() {
                        Err(error!(SyntaxError))
                    } else {
                        Ok(Expression::Element(name, args))
                    }
                } else {
                    Ok(Expression::Var(name))
                }
            }
            Some(Token::LParen) => {
                let expr = self.expression()?;
                self.expect(&Token::RParen)?;
                Ok(expr)
            }
            Some(Token::Operator(Operator::Minus)) => {
                let operand = self.primary()?;
                Ok(Expression::Unary(UnOp::Neg, Box::new(operand)))
            }
            Some(Token::Operator(Operator::Not)) => {
                let operand = self.primary()?;
                Ok(Expression::Unary(UnOp::Not, Box::new(operand)))
            }
            _ => Err(error!(SyntaxError)),
        }
    }
}

/// Parse a line-number token lexeme, enforcing the stored-line ceiling.
fn line_number(s: &str) -> Result<u16> {
    if !s.chars().all(|c| c.is_ascii_digit()) {
        return Err(error!(SyntaxError));
    }
    match s.parse::<u32>() {
        Ok(number) if number <= LineNumber::max_value() as u32 => Ok(number as u16),
        _ => Err(error!(IllegalLineNumber)),
    }
}
