// Syntax tree construction from grammar pairs
//
//  Copyright (C) 2014-2023 Ryan Specialty, LLC.
//
//  This file is part of MLANG.
//
//  This program is free software: you can redistribute it and/or modify
//  it under the terms of the GNU General Public License as published by
//  the Free Software Foundation, either version 3 of the License, or
//  (at your option) any later version.
//
//  This program is distributed in the hope that it will be useful,
//  but WITHOUT ANY WARRANTY; without even the implied warranty of
//  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//  GNU General Public License for more details.
//
//  You should have received a copy of the GNU General Public License
//  along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Construction of [`Declaration`]s from the raw pairs of [`MParser`].
//!
//! Each method handles exactly one grammar rule and is named after it.
//! Nesting depth is bounded by the grammar's own recursion,
//!   which pest already performs natively.
//!
//! [`MParser`]: super::MParser

use super::{ParseError, Rule};
use crate::{
    ast::*,
    span::{Context, Span},
};
use pest::iterators::{Pair, Pairs};
use std::str::FromStr;

type BuildResult<T> = Result<T, ParseError>;

/// Builds [`Declaration`]s from the pairs of a single source file.
#[derive(Debug, Clone, Copy)]
pub struct AstBuilder {
    ctx: Context,
}

impl AstBuilder {
    pub fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    fn span(&self, pair: &Pair<Rule>) -> Span {
        let pspan = pair.as_span();
        self.ctx
            .span_or_zz(pspan.start(), pspan.end() - pspan.start())
    }

    fn unexpected(&self, pair: &Pair<Rule>) -> ParseError {
        ParseError::UnexpectedRule {
            rule: pair.as_rule(),
            span: self.span(pair),
        }
    }

    /// Take the next child of `parent`,
    ///   which must be present.
    fn child<'i>(
        &self,
        inner: &mut Pairs<'i, Rule>,
        parent: Rule,
        span: Span,
    ) -> BuildResult<Pair<'i, Rule>> {
        inner.next().ok_or(ParseError::MissingChild { parent, span })
    }

    /// Take the next child of `parent`,
    ///   which must be of rule `expected`.
    fn expect<'i>(
        &self,
        inner: &mut Pairs<'i, Rule>,
        parent: Rule,
        span: Span,
        expected: Rule,
    ) -> BuildResult<Pair<'i, Rule>> {
        let pair = self.child(inner, parent, span)?;

        match pair.as_rule() {
            rule if rule == expected => Ok(pair),
            _ => Err(self.unexpected(&pair)),
        }
    }

    fn number<T: FromStr>(&self, pair: &Pair<Rule>) -> BuildResult<T> {
        pair.as_str()
            .parse()
            .map_err(|_| ParseError::InvalidNumber {
                span: self.span(pair),
                text: pair.as_str().to_string(),
            })
    }

    pub fn source_file(
        &self,
        pair: Pair<Rule>,
    ) -> BuildResult<Vec<Declaration>> {
        pair.into_inner()
            .filter(|p| p.as_rule() != Rule::EOI)
            .map(|p| self.declaration(p))
            .collect()
    }

    fn declaration(&self, pair: Pair<Rule>) -> BuildResult<Declaration> {
        use Declaration as D;

        match pair.as_rule() {
            Rule::application => self.application(pair).map(D::Application),
            Rule::enchaineur => self.enchaineur(pair).map(D::Enchaineur),
            Rule::variable_const => self
                .variable_const(pair)
                .map(|v| D::Variable(Variable::Const(v))),
            Rule::variable_calculee => self
                .variable_calculee(pair)
                .map(|v| D::Variable(Variable::Calculee(v))),
            Rule::variable_saisie => self
                .variable_saisie(pair)
                .map(|v| D::Variable(Variable::Saisie(v))),
            Rule::erreur => self.erreur(pair).map(D::Erreur),
            Rule::regle => self.regle(pair).map(D::Regle),
            Rule::verif => self.verif(pair).map(D::Verif),
            _ => Err(self.unexpected(&pair)),
        }
    }

    fn application(&self, pair: Pair<Rule>) -> BuildResult<Application> {
        let span = self.span(&pair);
        let mut inner = pair.into_inner();
        let name =
            self.expect(&mut inner, Rule::application, span, Rule::symbol)?;

        Ok(Application {
            name: name.as_str().to_string(),
            span,
        })
    }

    fn enchaineur(&self, pair: Pair<Rule>) -> BuildResult<Enchaineur> {
        let span = self.span(&pair);
        let mut inner = pair.into_inner();
        let name =
            self.expect(&mut inner, Rule::enchaineur, span, Rule::symbol)?;
        let apps = self.expect(
            &mut inner,
            Rule::enchaineur,
            span,
            Rule::applications_reference,
        )?;

        Ok(Enchaineur {
            name: name.as_str().to_string(),
            applications: self.applications_reference(apps)?,
            span,
        })
    }

    fn applications_reference(
        &self,
        pair: Pair<Rule>,
    ) -> BuildResult<Vec<String>> {
        let span = self.span(&pair);
        let mut inner = pair.into_inner();
        let list = self.expect(
            &mut inner,
            Rule::applications_reference,
            span,
            Rule::symbol_enumeration,
        )?;

        Ok(list.into_inner().map(|p| p.as_str().to_string()).collect())
    }

    fn variable_const(&self, pair: Pair<Rule>) -> BuildResult<ConstVariable> {
        let span = self.span(&pair);
        let mut inner = pair.into_inner();
        let name =
            self.expect(&mut inner, Rule::variable_const, span, Rule::symbol)?;
        let value = self.expect(
            &mut inner,
            Rule::variable_const,
            span,
            Rule::signed_number,
        )?;

        Ok(ConstVariable {
            name: name.as_str().to_string(),
            value: self.number(&value)?,
            span,
        })
    }

    fn variable_calculee(
        &self,
        pair: Pair<Rule>,
    ) -> BuildResult<CalculeeVariable> {
        let span = self.span(&pair);
        let mut inner = pair.into_inner();
        let name = self.expect(
            &mut inner,
            Rule::variable_calculee,
            span,
            Rule::symbol,
        )?;

        let mut var = CalculeeVariable {
            name: name.as_str().to_string(),
            base: false,
            restituee: false,
            tableau: None,
            description: String::new(),
            value_type: None,
            span,
        };

        for p in inner {
            match p.as_rule() {
                Rule::calculee_tableau => {
                    let tspan = self.span(&p);
                    let mut tinner = p.into_inner();
                    let dim = self.expect(
                        &mut tinner,
                        Rule::calculee_tableau,
                        tspan,
                        Rule::integer,
                    )?;
                    var.tableau = Some(self.number(&dim)?);
                }
                Rule::calculee_qualifier => match p.as_str() {
                    "base" => var.base = true,
                    "restituee" => var.restituee = true,
                    _ => return Err(self.unexpected(&p)),
                },
                Rule::string => var.description = self.string(p)?,
                Rule::value_type => var.value_type = Some(self.value_type(p)?),
                _ => return Err(self.unexpected(&p)),
            }
        }

        Ok(var)
    }

    fn variable_saisie(&self, pair: Pair<Rule>) -> BuildResult<SaisieVariable> {
        let span = self.span(&pair);
        let mut inner = pair.into_inner();
        let name =
            self.expect(&mut inner, Rule::variable_saisie, span, Rule::symbol)?;
        let subtype = self.expect(
            &mut inner,
            Rule::variable_saisie,
            span,
            Rule::saisie_subtype,
        )?;

        let mut var = SaisieVariable {
            name: name.as_str().to_string(),
            subtype: subtype
                .as_str()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" "),
            alias: None,
            attributes: vec![],
            restituee: false,
            description: String::new(),
            value_type: None,
            span,
        };

        for p in inner {
            match p.as_rule() {
                Rule::saisie_restituee => var.restituee = true,
                Rule::saisie_alias => {
                    let aspan = self.span(&p);
                    let mut ainner = p.into_inner();
                    let alias = self.expect(
                        &mut ainner,
                        Rule::saisie_alias,
                        aspan,
                        Rule::symbol,
                    )?;
                    var.alias = Some(alias.as_str().to_string());
                }
                Rule::saisie_attribute => {
                    let aspan = self.span(&p);
                    let mut ainner = p.into_inner();
                    let aname = self.expect(
                        &mut ainner,
                        Rule::saisie_attribute,
                        aspan,
                        Rule::symbol,
                    )?;
                    let avalue = self.expect(
                        &mut ainner,
                        Rule::saisie_attribute,
                        aspan,
                        Rule::integer,
                    )?;
                    var.attributes.push((
                        aname.as_str().to_string(),
                        self.number(&avalue)?,
                    ));
                }
                Rule::string => var.description = self.string(p)?,
                Rule::value_type => var.value_type = Some(self.value_type(p)?),
                _ => return Err(self.unexpected(&p)),
            }
        }

        var.attributes.sort();

        Ok(var)
    }

    fn value_type(&self, pair: Pair<Rule>) -> BuildResult<String> {
        let span = self.span(&pair);
        let mut inner = pair.into_inner();
        let ty = self.expect(&mut inner, Rule::value_type, span, Rule::symbol)?;

        Ok(ty.as_str().to_string())
    }

    /// Interior of a string literal,
    ///   without its delimiters.
    fn string(&self, pair: Pair<Rule>) -> BuildResult<String> {
        let span = self.span(&pair);
        let mut inner = pair.into_inner();
        let s =
            self.expect(&mut inner, Rule::string, span, Rule::string_inner)?;

        Ok(s.as_str().to_string())
    }

    fn erreur(&self, pair: Pair<Rule>) -> BuildResult<Erreur> {
        let span = self.span(&pair);
        let mut inner = pair.into_inner();
        let name = self.expect(&mut inner, Rule::erreur, span, Rule::symbol)?;
        let kind_pair =
            self.expect(&mut inner, Rule::erreur, span, Rule::erreur_type)?;
        let kind = ErreurKind::from_keyword(kind_pair.as_str())
            .ok_or_else(|| self.unexpected(&kind_pair))?;

        let mut strings = inner
            .map(|p| match p.as_rule() {
                Rule::string => self.string(p),
                _ => Err(self.unexpected(&p)),
            })
            .collect::<BuildResult<Vec<_>>>()?;

        if strings.len() != 5 {
            return Err(ParseError::MissingChild {
                parent: Rule::erreur,
                span,
            });
        }

        // The fourth string is the description;
        //   all others are codes.
        let description = strings.remove(3);

        Ok(Erreur {
            name: name.as_str().to_string(),
            kind,
            codes: strings,
            description,
            span,
        })
    }

    fn regle(&self, pair: Pair<Rule>) -> BuildResult<Regle> {
        let span = self.span(&pair);

        let mut symbols = Vec::new();
        let mut applications = None;
        let mut enchaineur = None;
        let mut formulas = Vec::new();

        for p in pair.into_inner() {
            match p.as_rule() {
                Rule::symbol => symbols.push(p.as_str().to_string()),
                Rule::applications_reference => {
                    applications = Some(self.applications_reference(p)?)
                }
                Rule::enchaineur_reference => {
                    let espan = self.span(&p);
                    let mut einner = p.into_inner();
                    let name = self.expect(
                        &mut einner,
                        Rule::enchaineur_reference,
                        espan,
                        Rule::symbol,
                    )?;
                    enchaineur = Some(name.as_str().to_string());
                }
                Rule::formula => {
                    formulas.push(RegleFormula::Single(self.formula(p)?))
                }
                Rule::pour_formula => {
                    formulas.push(RegleFormula::Pour(self.pour_formula(p)?))
                }
                _ => return Err(self.unexpected(&p)),
            }
        }

        // Leading symbols are tags;
        //   the last is the name of the rule.
        let name = symbols.pop().ok_or(ParseError::MissingChild {
            parent: Rule::regle,
            span,
        })?;

        Ok(Regle {
            name,
            tags: symbols,
            applications: applications.ok_or(ParseError::MissingChild {
                parent: Rule::regle,
                span,
            })?,
            enchaineur,
            formulas,
            span,
        })
    }

    fn formula(&self, pair: Pair<Rule>) -> BuildResult<Formula> {
        let span = self.span(&pair);
        let mut inner = pair.into_inner();
        let name = self.expect(&mut inner, Rule::formula, span, Rule::symbol)?;

        let mut index = None;
        let mut next = self.child(&mut inner, Rule::formula, span)?;

        if next.as_rule() == Rule::brackets {
            index = Some(self.brackets(next)?);
            next = self.child(&mut inner, Rule::formula, span)?;
        }

        Ok(Formula {
            name: name.as_str().to_string(),
            index,
            expression: self.expression(next)?,
            span,
        })
    }

    fn brackets(&self, pair: Pair<Rule>) -> BuildResult<Index> {
        let span = self.span(&pair);
        let mut inner = pair.into_inner();
        let index = self.child(&mut inner, Rule::brackets, span)?;

        match index.as_rule() {
            Rule::integer => self.number(&index).map(Index::Integer),
            Rule::symbol => Ok(Index::Symbol(index.as_str().to_string())),
            _ => Err(self.unexpected(&index)),
        }
    }

    fn pour_formula(&self, pair: Pair<Rule>) -> BuildResult<PourFormula> {
        let span = self.span(&pair);
        let mut inner = pair.into_inner();
        let vars = self.expect(
            &mut inner,
            Rule::pour_formula,
            span,
            Rule::loop_variables,
        )?;
        let formula =
            self.expect(&mut inner, Rule::pour_formula, span, Rule::formula)?;

        Ok(PourFormula {
            loop_variables: self.loop_variables(vars)?,
            formula: self.formula(formula)?,
            span,
        })
    }

    fn loop_variables(
        &self,
        pair: Pair<Rule>,
    ) -> BuildResult<Vec<LoopVariable>> {
        pair.into_inner()
            .map(|p| match p.as_rule() {
                Rule::loop_variable1 | Rule::loop_variable2 => {
                    self.loop_variable(p)
                }
                _ => Err(self.unexpected(&p)),
            })
            .collect()
    }

    fn loop_variable(&self, pair: Pair<Rule>) -> BuildResult<LoopVariable> {
        let span = self.span(&pair);
        let rule = pair.as_rule();
        let mut inner = pair.into_inner();
        let name = self.expect(&mut inner, rule, span, Rule::symbol)?;
        let domain = self.expect(&mut inner, rule, span, Rule::enumeration)?;

        Ok(LoopVariable {
            name: name.as_str().to_string(),
            domain: self.enumeration(domain)?,
        })
    }

    /// Explicit values of an enumeration are gathered,
    ///   in source order,
    ///   into a single leading [`DomainPart::Values`];
    ///     intervals follow in source order.
    fn enumeration(&self, pair: Pair<Rule>) -> BuildResult<Vec<DomainPart>> {
        let mut values = Vec::new();
        let mut intervals = Vec::new();

        for p in pair.into_inner() {
            match p.as_rule() {
                Rule::integer => {
                    values.push(LoopValue::Integer(self.number(&p)?))
                }
                Rule::symbol => {
                    values.push(LoopValue::Symbol(p.as_str().to_string()))
                }
                Rule::interval => {
                    let span = self.span(&p);
                    let mut inner = p.into_inner();
                    let mut bound = || {
                        self.expect(
                            &mut inner,
                            Rule::interval,
                            span,
                            Rule::integer,
                        )
                    };
                    let first = bound()?;
                    let last = bound()?;

                    intervals.push(DomainPart::Interval {
                        first: self.number(&first)?,
                        last: self.number(&last)?,
                    });
                }
                _ => return Err(self.unexpected(&p)),
            }
        }

        let mut parts = Vec::with_capacity(intervals.len() + 1);
        if !values.is_empty() {
            parts.push(DomainPart::Values(values));
        }
        parts.extend(intervals);

        Ok(parts)
    }

    fn verif(&self, pair: Pair<Rule>) -> BuildResult<Verif> {
        let span = self.span(&pair);

        let mut symbols = Vec::new();
        let mut applications = None;
        let mut conditions = Vec::new();

        for p in pair.into_inner() {
            match p.as_rule() {
                Rule::symbol => symbols.push(p.as_str().to_string()),
                Rule::applications_reference => {
                    applications = Some(self.applications_reference(p)?)
                }
                Rule::verif_condition => {
                    conditions.push(self.verif_condition(p)?)
                }
                _ => return Err(self.unexpected(&p)),
            }
        }

        let name = symbols.pop().ok_or(ParseError::MissingChild {
            parent: Rule::verif,
            span,
        })?;

        Ok(Verif {
            name,
            tags: symbols,
            applications: applications.ok_or(ParseError::MissingChild {
                parent: Rule::verif,
                span,
            })?,
            conditions,
            span,
        })
    }

    fn verif_condition(&self, pair: Pair<Rule>) -> BuildResult<VerifCondition> {
        let span = self.span(&pair);
        let mut inner = pair.into_inner();
        let expr = self.expect(
            &mut inner,
            Rule::verif_condition,
            span,
            Rule::expression,
        )?;
        let error_name =
            self.expect(&mut inner, Rule::verif_condition, span, Rule::symbol)?;
        let variable_name = inner.next().map(|p| p.as_str().to_string());

        Ok(VerifCondition {
            expression: self.expression(expr)?,
            error_name: error_name.as_str().to_string(),
            variable_name,
        })
    }

    /// Collect an alternating list of operands and operators.
    ///
    /// A chain with a single operand yields that operand alone,
    ///   without operators.
    fn chain<Op>(
        &self,
        pair: Pair<Rule>,
        operand: impl Fn(&Self, Pair<Rule>) -> BuildResult<Expression>,
        op_rule: Rule,
        op: impl Fn(&str) -> Option<Op>,
    ) -> BuildResult<(Vec<Expression>, Vec<Op>)> {
        let mut operands = Vec::new();
        let mut operators = Vec::new();

        for p in pair.into_inner() {
            if p.as_rule() == op_rule {
                let operator =
                    op(p.as_str()).ok_or_else(|| self.unexpected(&p))?;
                operators.push(operator);
            } else {
                operands.push(operand(self, p)?);
            }
        }

        Ok((operands, operators))
    }

    fn expression(&self, pair: Pair<Rule>) -> BuildResult<Expression> {
        if pair.as_rule() != Rule::expression {
            return Err(self.unexpected(&pair));
        }

        let span = self.span(&pair);
        let (mut operands, operators) = self.chain(
            pair,
            Self::comparaison,
            Rule::boolean_operator,
            BoolOp::from_token,
        )?;

        match operands.len() {
            0 => Err(ParseError::MissingChild {
                parent: Rule::expression,
                span,
            }),
            1 if operators.is_empty() => Ok(operands.remove(0)),
            _ => Ok(Expression::Boolean {
                operands,
                operators,
            }),
        }
    }

    fn comparaison(&self, pair: Pair<Rule>) -> BuildResult<Expression> {
        if pair.as_rule() != Rule::comparaison {
            return Err(self.unexpected(&pair));
        }

        let span = self.span(&pair);
        let mut inner = pair.into_inner();
        let left = self.expect(
            &mut inner,
            Rule::comparaison,
            span,
            Rule::sum_expression,
        )?;
        let left = self.sum_expression(left)?;

        let Some(next) = inner.next() else {
            return Ok(left);
        };

        match next.as_rule() {
            Rule::comparison_operator => {
                let operator = CmpOp::from_token(next.as_str())
                    .ok_or_else(|| self.unexpected(&next))?;
                let right = self.expect(
                    &mut inner,
                    Rule::comparaison,
                    span,
                    Rule::sum_expression,
                )?;

                Ok(Expression::Comparison {
                    left: Box::new(left),
                    operator,
                    right: Box::new(self.sum_expression(right)?),
                })
            }

            Rule::dans_suffix => {
                let dspan = self.span(&next);
                let mut dinner = next.into_inner();
                let mut enumeration =
                    self.child(&mut dinner, Rule::dans_suffix, dspan)?;
                let negated = enumeration.as_rule() == Rule::negation;

                if negated {
                    enumeration =
                        self.child(&mut dinner, Rule::dans_suffix, dspan)?;
                }

                Ok(Expression::Dans {
                    expression: Box::new(left),
                    enumeration: self.enumeration(enumeration)?,
                    negated,
                })
            }

            _ => Err(self.unexpected(&next)),
        }
    }

    fn sum_expression(&self, pair: Pair<Rule>) -> BuildResult<Expression> {
        let span = self.span(&pair);
        let (mut operands, operators) = self.chain(
            pair,
            Self::product_expression,
            Rule::sum_operator,
            SumOp::from_token,
        )?;

        match operands.len() {
            0 => Err(ParseError::MissingChild {
                parent: Rule::sum_expression,
                span,
            }),
            1 => Ok(operands.remove(0)),
            _ => Ok(Expression::Sum {
                operands,
                operators,
            }),
        }
    }

    fn product_expression(&self, pair: Pair<Rule>) -> BuildResult<Expression> {
        if pair.as_rule() != Rule::product_expression {
            return Err(self.unexpected(&pair));
        }

        let span = self.span(&pair);
        let (mut operands, operators) = self.chain(
            pair,
            Self::factor,
            Rule::product_operator,
            ProductOp::from_token,
        )?;

        match operands.len() {
            0 => Err(ParseError::MissingChild {
                parent: Rule::product_expression,
                span,
            }),
            1 => Ok(operands.remove(0)),
            _ => Ok(Expression::Product {
                operands,
                operators,
            }),
        }
    }

    /// An atom optionally preceded by a unary operator.
    ///
    /// A minus sign directly before a numeric literal is folded into the
    ///   literal;
    ///     all other unary operations remain explicit.
    fn factor(&self, pair: Pair<Rule>) -> BuildResult<Expression> {
        if pair.as_rule() != Rule::factor {
            return Err(self.unexpected(&pair));
        }

        let span = self.span(&pair);
        let mut inner = pair.into_inner();
        let first = self.child(&mut inner, Rule::factor, span)?;

        if first.as_rule() != Rule::unary {
            return self.atom(first);
        }

        let operator = UnaryOp::from_token(first.as_str())
            .ok_or_else(|| self.unexpected(&first))?;
        let operand = self.child(&mut inner, Rule::factor, span)?;

        match (operator, self.atom(operand)?) {
            (UnaryOp::Minus, Expression::Integer(i)) => {
                Ok(Expression::Integer(-i))
            }
            (UnaryOp::Minus, Expression::Float(f)) => Ok(Expression::Float(-f)),
            (operator, expr) => Ok(Expression::Unary {
                operator,
                expression: Box::new(expr),
            }),
        }
    }

    fn atom(&self, pair: Pair<Rule>) -> BuildResult<Expression> {
        match pair.as_rule() {
            Rule::symbol => Ok(Expression::Symbol(pair.as_str().to_string())),
            Rule::integer => self.number(&pair).map(Expression::Integer),
            Rule::float => self.number(&pair).map(Expression::Float),
            Rule::expression => self.expression(pair),
            Rule::ternary => self.ternary(pair),
            Rule::function_call => self.function_call(pair),
            _ => Err(self.unexpected(&pair)),
        }
    }

    fn ternary(&self, pair: Pair<Rule>) -> BuildResult<Expression> {
        let span = self.span(&pair);
        let mut inner = pair.into_inner();
        let cond =
            self.expect(&mut inner, Rule::ternary, span, Rule::expression)?;
        let if_true =
            self.expect(&mut inner, Rule::ternary, span, Rule::expression)?;
        let if_false = inner
            .next()
            .map(|p| self.expression(p).map(Box::new))
            .transpose()?;

        Ok(Expression::Ternary {
            condition: Box::new(self.expression(cond)?),
            if_true: Box::new(self.expression(if_true)?),
            if_false,
        })
    }

    fn function_call(&self, pair: Pair<Rule>) -> BuildResult<Expression> {
        let span = self.span(&pair);
        let mut inner = pair.into_inner();
        let name =
            self.expect(&mut inner, Rule::function_call, span, Rule::symbol)?;
        let args = self.expect(
            &mut inner,
            Rule::function_call,
            span,
            Rule::function_arguments,
        )?;

        let arguments = args
            .into_inner()
            .map(|p| match p.as_rule() {
                Rule::expression => {
                    self.expression(p).map(Argument::Expression)
                }
                Rule::loop_expression => {
                    self.loop_expression(p).map(Argument::Loop)
                }
                _ => Err(self.unexpected(&p)),
            })
            .collect::<BuildResult<Vec<_>>>()?;

        Ok(Expression::Call {
            name: name.as_str().to_string(),
            arguments,
        })
    }

    fn loop_expression(&self, pair: Pair<Rule>) -> BuildResult<LoopExpression> {
        let span = self.span(&pair);
        let mut inner = pair.into_inner();
        let vars = self.expect(
            &mut inner,
            Rule::loop_expression,
            span,
            Rule::loop_variables,
        )?;
        let expr = self.expect(
            &mut inner,
            Rule::loop_expression,
            span,
            Rule::expression,
        )?;

        Ok(LoopExpression {
            loop_variables: self.loop_variables(vars)?,
            expression: Box::new(self.expression(expr)?),
        })
    }
}
