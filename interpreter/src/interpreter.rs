use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use crate::ast::{Expr, ExprVisitor, Stmt, StmtVisitor};
use crate::env::Environment;
use crate::error::Error;
use crate::parser::StmtStream;
use crate::value::Value;
use tarn_core::{Literal, Token, Type};

pub struct Interpreter {
    env: Rc<RefCell<Environment>>,
    stdout: Rc<RefCell<dyn Write>>,
}

impl Interpreter {
    pub fn new(stdout: Rc<RefCell<dyn Write>>) -> Self {
        Interpreter {
            env: Rc::new(RefCell::new(Environment::new())),
            stdout,
        }
    }

    // Statements run in order. The first runtime error aborts the rest of
    // this batch and is handed back to the caller for reporting.
    pub fn interpret(&mut self, stmts: &StmtStream) -> Result<(), Error> {
        for stmt in &stmts.0 {
            self.visit_stmt(stmt)?;
        }
        Ok(())
    }

    fn execute_block_with_env(
        &mut self,
        stmts: &[Stmt],
        env: Rc<RefCell<Environment>>,
    ) -> Result<(), Error> {
        let current = self.env.clone();
        self.env = env;
        for stmt in stmts {
            if let err @ Err(_) = self.visit_stmt(stmt) {
                self.env = current;
                return err;
            }
        }
        self.env = current;
        Ok(())
    }

    // Nil and false are falsy, every other value is truthy, 0 and "" included.
    fn is_truthy(value: &Value) -> bool {
        !matches!(value, Value::Nil | Value::Bool(false))
    }
}

impl ExprVisitor for Interpreter {
    type Item = Value;

    fn visit_assign(&mut self, name: &Token, value: &Expr) -> Result<Value, Error> {
        let value = self.visit_expr(value)?;

        match RefCell::borrow_mut(&self.env).assign(&name.lexeme, value.clone()) {
            // Assignment is an expression and yields the assigned value.
            Ok(_) => Ok(value),
            Err(_) => Err(Error::runtime_error(
                name,
                &format!("Undefined variable '{}'.", name.lexeme),
            )),
        }
    }

    fn visit_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Result<Value, Error> {
        let left = self.visit_expr(left)?;
        let right = self.visit_expr(right)?;

        match operator.ty {
            Type::Minus => match (left, right) {
                (Value::Num(left), Value::Num(right)) => Ok(Value::from(left - right)),
                _ => Err(Error::runtime_error(operator, "Operands must be numbers.")),
            },
            Type::Plus => match (left, right) {
                (Value::Num(left), Value::Num(right)) => Ok(Value::from(left + right)),
                (Value::Str(left), Value::Str(right)) => {
                    Ok(Value::from(String::from(left.as_str()) + &right))
                }
                _ => Err(Error::runtime_error(
                    operator,
                    "Operands must be two numbers or two strings.",
                )),
            },
            Type::Slash => match (left, right) {
                (Value::Num(left), Value::Num(right)) => Ok(Value::from(left / right)),
                _ => Err(Error::runtime_error(operator, "Operands must be numbers.")),
            },
            Type::Star => match (left, right) {
                (Value::Num(left), Value::Num(right)) => Ok(Value::from(left * right)),
                _ => Err(Error::runtime_error(operator, "Operands must be numbers.")),
            },
            Type::Greater => match (left, right) {
                (Value::Num(left), Value::Num(right)) => Ok(Value::Bool(left > right)),
                _ => Err(Error::runtime_error(operator, "Operands must be numbers.")),
            },
            Type::GreaterEqual => match (left, right) {
                (Value::Num(left), Value::Num(right)) => Ok(Value::Bool(left >= right)),
                _ => Err(Error::runtime_error(operator, "Operands must be numbers.")),
            },
            Type::Less => match (left, right) {
                (Value::Num(left), Value::Num(right)) => Ok(Value::Bool(left < right)),
                _ => Err(Error::runtime_error(operator, "Operands must be numbers.")),
            },
            Type::LessEqual => match (left, right) {
                (Value::Num(left), Value::Num(right)) => Ok(Value::Bool(left <= right)),
                _ => Err(Error::runtime_error(operator, "Operands must be numbers.")),
            },
            Type::EqualEqual => Ok(Value::Bool(left == right)),
            Type::BangEqual => Ok(Value::Bool(left != right)),
            _ => Err(Error::runtime_error(operator, "Invalid operator.")),
        }
    }

    fn visit_grouping(&mut self, expression: &Expr) -> Result<Value, Error> {
        self.visit_expr(expression)
    }

    fn visit_literal(&mut self, value: &Literal) -> Result<Value, Error> {
        Ok(Value::from(value.clone()))
    }

    fn visit_logical(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Result<Value, Error> {
        let left = self.visit_expr(left)?;

        // Short-circuit with whichever operand value decided the result, not
        // a coerced boolean: the left operand if it decides, else the right.
        match operator.ty {
            Type::Or if Self::is_truthy(&left) => Ok(left),
            Type::And if !Self::is_truthy(&left) => Ok(left),
            _ => self.visit_expr(right),
        }
    }

    fn visit_unary(&mut self, operator: &Token, right: &Expr) -> Result<Value, Error> {
        let right = self.visit_expr(right)?;
        match (operator.ty, right) {
            (Type::Minus, Value::Num(val)) => Ok(Value::from(-val)),
            (Type::Minus, _) => Err(Error::runtime_error(operator, "Operand must be a number.")),
            (Type::Bang, val) => Ok(Value::Bool(!Self::is_truthy(&val))),
            _ => Err(Error::runtime_error(operator, "Invalid operator.")),
        }
    }

    fn visit_variable(&mut self, name: &Token) -> Result<Value, Error> {
        match RefCell::borrow(&self.env).get(&name.lexeme) {
            Some(value) => Ok(value),
            None => Err(Error::runtime_error(
                name,
                &format!("Undefined variable '{}'.", name.lexeme),
            )),
        }
    }
}

impl StmtVisitor for Interpreter {
    type Item = ();

    fn visit_block(&mut self, statements: &[Stmt]) -> Result<(), Error> {
        let env = Rc::new(RefCell::new(Environment::with(self.env.clone())));
        self.execute_block_with_env(statements, env)
    }

    fn visit_expression(&mut self, expression: &Expr) -> Result<(), Error> {
        self.visit_expr(expression)?;
        Ok(())
    }

    fn visit_if(
        &mut self,
        condition: &Expr,
        then_branch: &Stmt,
        else_branch: Option<&Stmt>,
    ) -> Result<(), Error> {
        let value = self.visit_expr(condition)?;
        if Self::is_truthy(&value) {
            self.visit_stmt(then_branch)
        } else if let Some(else_branch) = else_branch {
            self.visit_stmt(else_branch)
        } else {
            Ok(())
        }
    }

    fn visit_print(&mut self, expression: &Expr) -> Result<(), Error> {
        let value = self.visit_expr(expression)?;
        writeln!(RefCell::borrow_mut(&self.stdout), "{}", value).unwrap();
        Ok(())
    }

    fn visit_var(&mut self, name: &Token, init: Option<&Expr>) -> Result<(), Error> {
        let value = match init {
            Some(expr) => self.visit_expr(expr)?,
            None => Value::Nil,
        };

        match RefCell::borrow_mut(&self.env).define(&name.lexeme, value) {
            Ok(_) => Ok(()),
            Err(_) => Err(Error::runtime_error(
                name,
                &format!("Variable '{}' is already defined in this scope.", name.lexeme),
            )),
        }
    }
}
