#[derive(Debug, PartialEq, Clone)]
pub struct Error {
    code: ErrorCode,
}

#[macro_export]
macro_rules! error {
    ($code:ident) => {
        $crate::lang::Error::from_code($crate::lang::ErrorCode::$code)
    };
}

impl Error {
    pub fn from_code(code: ErrorCode) -> Error {
        Error { code }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ErrorCode {
    SyntaxError,
    IllegalFunctionCall,
    IllegalLineNumber,
    IllegalVariableName,
    UndefinedLineNumber,
    UndefinedStatement,
    UndefinedFunction,
    TypeMismatch,
    DivisionByZero,
    OutOfData,
    SubscriptOutOfRange,
    NextWithoutFor,
    ReturnWithoutGosub,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use ErrorCode::*;
        let s = match self.code {
            SyntaxError => "SYNTAX ERROR",
            IllegalFunctionCall => "ILLEGAL FUNCTION CALL",
            IllegalLineNumber => "ILLEGAL LINE NUMBER",
            IllegalVariableName => "ILLEGAL VARIABLE NAME",
            UndefinedLineNumber => "UNDEFINED LINE NUMBER",
            UndefinedStatement => "UNDEFINED STATEMENT",
            UndefinedFunction => "UNDEFINED FUNCTION",
            TypeMismatch => "TYPE MISMATCH",
            DivisionByZero => "DIVISION BY ZERO",
            OutOfData => "OUT OF DATA",
            SubscriptOutOfRange => "SUBSCRIPT OUT OF RANGE",
            NextWithoutFor => "NEXT WITHOUT FOR",
            ReturnWithoutGosub => "RETURN WITHOUT GOSUB",
        };
        write!(f, "{}", s)
    }
}
